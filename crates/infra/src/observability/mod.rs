//! Observability hooks for the session
//!
//! Request tracing goes through `tracing` directly; this module holds the
//! injected diagnostics sink that receives traces of unhandled errors.

pub mod diagnostics;

pub use diagnostics::{render_trace, DiagnosticsSink, NoopDiagnostics, TracingDiagnostics};
