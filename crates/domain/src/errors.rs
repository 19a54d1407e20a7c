//! Error types used throughout the SDK

use thiserror::Error;

/// Coarse classification of [`SdkError`] used by callers that branch on the
/// failure kind rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never produced a response (connect, DNS, body read)
    Transport,
    /// Credentials could not be refreshed or stayed rejected
    Authorization,
    /// The server answered with a 4xx/5xx status
    HttpStatus,
    /// A caller-supplied success callback failed
    Callback,
    /// Local misconfiguration (bad host, bad settings file, bad payload)
    Configuration,
}

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unauthorized: {url} still rejected after {attempts} attempts (HTTP {status})")]
    Unauthorized { status: u16, url: String, attempts: u32 },

    #[error("HTTP {status} error for url: {url}")]
    Http { status: u16, url: String, body: String },

    #[error("Callback error: {0}")]
    Callback(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SdkError {
    /// Get the category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Unauthorized { .. } | Self::Auth(_) => ErrorCategory::Authorization,
            Self::Http { .. } => ErrorCategory::HttpStatus,
            Self::Callback(_) => ErrorCategory::Callback,
            Self::InvalidUrl(_) | Self::Config(_) | Self::Serialization(_) => {
                ErrorCategory::Configuration
            }
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for errors raised from a received response (status or auth)
    pub fn is_http(&self) -> bool {
        self.status().is_some()
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
