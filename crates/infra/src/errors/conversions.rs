//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use vaultline_domain::SdkError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SdkError);

impl From<InfraError> for SdkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SdkError> for InfraError {
    fn from(value: SdkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSdkError {
    fn into_sdk(self) -> SdkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SdkError */
/* -------------------------------------------------------------------------- */

// Every reqwest failure is a transport failure: the session turns status codes
// into errors itself, so `error_for_status` is never used on this path.
impl IntoSdkError for HttpError {
    fn into_sdk(self) -> SdkError {
        let target = self.url().map(|url| url.as_str().to_string()).unwrap_or_default();

        if self.is_timeout() {
            return SdkError::Transport(format!("HTTP request timed out: {target}"));
        }

        if self.is_connect() {
            return SdkError::Transport(format!("HTTP connection failure: {target}"));
        }

        if self.is_builder() {
            return SdkError::Transport(format!("malformed request: {self}"));
        }

        if self.is_body() || self.is_decode() {
            return SdkError::Transport(format!("failed to read response body: {self}"));
        }

        SdkError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_sdk())
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(SdkError::InvalidUrl(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
