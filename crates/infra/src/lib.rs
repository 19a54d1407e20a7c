//! # Vaultline Infrastructure
//!
//! HTTP side of the Vaultline SDK.
//!
//! This crate contains:
//! - The authenticated [`Session`] with retry-on-unauthorized and lazy
//!   re-authentication
//! - The pluggable [`Transport`] and its reqwest implementation
//! - Auth handlers (basic credentials, token providers)
//! - Settings loading from environment and files
//! - Resource clients for legal holds and devices
//!
//! ## Architecture
//! - Plain request/response and settings types live in `vaultline-domain`
//! - Everything that performs I/O lives here

pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use auth::{AuthHandler, BasicAuthHandler, TokenAuthHandler, TokenProvider};
pub use client::{SdkClient, SdkClientBuilder};
pub use errors::InfraError;
pub use http::*;
pub use observability::{DiagnosticsSink, NoopDiagnostics, TracingDiagnostics};
pub use vaultline_domain::{
    ApiResponse, DebugLevel, HttpMethod, HttpRequest, PoolConfig, ProxySettings, RequestOptions,
    Result, SdkError, SdkSettings,
};
