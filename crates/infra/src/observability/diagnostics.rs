//! Diagnostics sink for unhandled request errors
//!
//! When a request fails and the caller did not supply an error callback, the
//! session renders a trace of the failure and hands it to the sink before
//! returning the error. Sinks are best-effort: they cannot fail and cannot
//! change the outcome of the request.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use vaultline_domain::{HttpMethod, SdkError};

/// Receives traces of errors that are about to propagate to the caller.
pub trait DiagnosticsSink: Send + Sync {
    /// Record one rendered error trace.
    fn report(&self, trace: &str);
}

/// Default sink: drops every trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticsSink for NoopDiagnostics {
    fn report(&self, _trace: &str) {}
}

/// Forwards traces to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, trace: &str) {
        tracing::error!(
            target: "vaultline::diagnostics",
            trace = %trace,
            "unhandled request error"
        );
    }
}

impl<F> DiagnosticsSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, trace: &str) {
        self(trace);
    }
}

impl fmt::Debug for dyn DiagnosticsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiagnosticsSink")
    }
}

/// Render the trace reported for a failed request.
///
/// The first line names the request and the error; the error's source chain
/// follows, then a backtrace when `RUST_BACKTRACE` enables capture.
pub fn render_trace(method: HttpMethod, url: &str, error: &SdkError) -> String {
    let mut trace = format!("{method} {url}: {error}");

    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(trace, "\n  caused by: {cause}");
        source = cause.source();
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(trace, "\n{backtrace}");
    }

    trace
}
