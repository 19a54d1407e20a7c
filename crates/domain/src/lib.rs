//! # Vaultline Domain
//!
//! Plain data types shared by the Vaultline SDK crates.
//!
//! This crate contains:
//! - The SDK error taxonomy and Result alias
//! - Settings and connection pool configuration
//! - HTTP request/response values passed between session and transport
//! - Session defaults
//!
//! ## Architecture
//! - No dependencies on other Vaultline crates
//! - No I/O; everything here is data

pub mod config;
pub mod constants;
pub mod errors;
pub mod http;
pub mod macros;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use http::*;
