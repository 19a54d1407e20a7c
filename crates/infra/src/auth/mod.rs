//! Authentication handlers for [`Session`]
//!
//! A session consults its handler after every response and, when the
//! handler flags one as unauthorized, asks it to refresh credentials before
//! the retry. Handlers refresh by mutating session headers.

pub mod basic;
pub mod token;

use vaultline_domain::{ApiResponse, Result};

pub use basic::BasicAuthHandler;
pub use token::{TokenAuthHandler, TokenProvider};

use crate::http::Session;

/// Detects rejected credentials and re-establishes them on a session.
///
/// `handle_unauthorized` runs while the session holds its re-auth lock, so it
/// must not issue requests through the same session.
pub trait AuthHandler: Send + Sync {
    /// Whether `response` means the current credentials were rejected.
    fn response_indicates_unauthorized(&self, response: &ApiResponse) -> bool;

    /// Refresh credentials on `session`, typically by setting a header.
    ///
    /// # Errors
    /// Any error aborts the request that triggered the refresh.
    fn handle_unauthorized(&self, session: &Session) -> Result<()>;
}

/// Status the bundled handlers treat as "credentials rejected".
pub(crate) const UNAUTHORIZED: u16 = 401;
