//! Token-based authentication
//!
//! The handler asks a [`TokenProvider`] for a fresh token on every refresh
//! and stores it in the session's `Authorization` header. How the token is
//! obtained (a login endpoint, a keychain, an environment variable) is the
//! provider's business.

use tracing::debug;
use vaultline_domain::{ApiResponse, Result, SdkError};

use super::{AuthHandler, UNAUTHORIZED};
use crate::http::Session;

/// Source of access tokens.
///
/// This trait allows dependency injection and testing with mock providers.
pub trait TokenProvider: Send + Sync {
    /// Fetch a currently valid token.
    ///
    /// # Errors
    /// Implementations should return `SdkError::Auth` when no token can be
    /// produced.
    fn fetch_token(&self) -> Result<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn fetch_token(&self) -> Result<String> {
        self()
    }
}

/// Sets `Authorization: <scheme> <token>` from a [`TokenProvider`].
pub struct TokenAuthHandler<P> {
    provider: P,
    scheme: String,
}

impl<P: TokenProvider> TokenAuthHandler<P> {
    /// Handler using the `Bearer` scheme.
    pub fn new(provider: P) -> Self {
        Self { provider, scheme: "Bearer".to_string() }
    }

    /// Use a service-specific scheme such as `v3_user_token`.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl<P: TokenProvider> AuthHandler for TokenAuthHandler<P> {
    fn response_indicates_unauthorized(&self, response: &ApiResponse) -> bool {
        response.status == UNAUTHORIZED
    }

    fn handle_unauthorized(&self, session: &Session) -> Result<()> {
        let token = self.provider.fetch_token()?;
        if token.trim().is_empty() {
            return Err(SdkError::Auth("token provider returned an empty token".into()));
        }

        debug!(host = %session.host_address(), scheme = %self.scheme, "applying refreshed token");
        session.set_header("Authorization", format!("{} {}", self.scheme, token));
        Ok(())
    }
}
