use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use vaultline_domain::{ApiResponse, Result};

use super::{AuthHandler, UNAUTHORIZED};
use crate::http::Session;

/// HTTP basic authentication.
#[derive(Clone)]
pub struct BasicAuthHandler {
    username: String,
    password: String,
}

impl BasicAuthHandler {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl std::fmt::Debug for BasicAuthHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthHandler")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthHandler for BasicAuthHandler {
    fn response_indicates_unauthorized(&self, response: &ApiResponse) -> bool {
        response.status == UNAUTHORIZED
    }

    fn handle_unauthorized(&self, session: &Session) -> Result<()> {
        session.set_header("Authorization", self.header_value());
        Ok(())
    }
}
