//! SDK entry point
//!
//! [`SdkClient`] owns the shared [`Session`]s and hands out resource clients
//! bound to them. Most endpoints go through the default session; a few
//! legal hold endpoints need a session authenticated with a v3 user token,
//! which can be configured separately and otherwise falls back to the
//! default one.

use std::sync::Arc;

use tracing::info;
use vaultline_domain::{PoolConfig, Result, SdkSettings};

use crate::auth::AuthHandler;
use crate::clients::{DeviceClient, LegalHoldClient};
use crate::http::{ReqwestTransport, Session, Transport};
use crate::observability::{DiagnosticsSink, NoopDiagnostics};

#[derive(Debug)]
pub struct SdkClient {
    session: Arc<Session>,
    v3_session: Arc<Session>,
}

impl SdkClient {
    pub fn builder(host: impl Into<String>) -> SdkClientBuilder {
        SdkClientBuilder {
            host: host.into(),
            auth_handler: None,
            v3_auth_handler: None,
            settings: SdkSettings::default(),
            pool: PoolConfig::default(),
            diagnostics: Arc::new(NoopDiagnostics),
            transport: None,
        }
    }

    /// Wrap an already configured session, used for every endpoint.
    pub fn from_session(session: Arc<Session>) -> Self {
        Self { v3_session: Arc::clone(&session), session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Session used by endpoints that require a v3 user token.
    pub fn v3_session(&self) -> &Arc<Session> {
        &self.v3_session
    }

    pub fn legal_hold(&self) -> LegalHoldClient {
        LegalHoldClient::with_v3_session(Arc::clone(&self.session), Arc::clone(&self.v3_session))
    }

    pub fn devices(&self) -> DeviceClient {
        DeviceClient::new(Arc::clone(&self.session))
    }
}

/// Builder for [`SdkClient`].
///
/// Both sessions share the settings, diagnostics sink and transport (and so
/// the connection pool).
pub struct SdkClientBuilder {
    host: String,
    auth_handler: Option<Arc<dyn AuthHandler>>,
    v3_auth_handler: Option<Arc<dyn AuthHandler>>,
    settings: SdkSettings,
    pool: PoolConfig,
    diagnostics: Arc<dyn DiagnosticsSink>,
    transport: Option<Arc<dyn Transport>>,
}

impl SdkClientBuilder {
    pub fn auth_handler(mut self, handler: Arc<dyn AuthHandler>) -> Self {
        self.auth_handler = Some(handler);
        self
    }

    /// Handler for the session behind v3-token endpoints.
    pub fn v3_auth_handler(mut self, handler: Arc<dyn AuthHandler>) -> Self {
        self.v3_auth_handler = Some(handler);
        self
    }

    pub fn settings(mut self, settings: SdkSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// # Errors
    /// Returns `SdkError::InvalidUrl` for an unparseable host and
    /// `SdkError::Transport` if the default transport cannot be built.
    pub fn build(self) -> Result<SdkClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_settings(&self.settings, &self.pool)?),
        };

        let session_for = |handler: Option<Arc<dyn AuthHandler>>| -> Result<Arc<Session>> {
            let mut builder = Session::builder(self.host.clone())
                .transport(Arc::clone(&transport))
                .diagnostics(Arc::clone(&self.diagnostics))
                .settings(self.settings.clone());
            if let Some(handler) = handler {
                builder = builder.auth_handler(handler);
            }
            Ok(Arc::new(builder.build()?))
        };

        let session = session_for(self.auth_handler.clone())?;
        let v3_session = match self.v3_auth_handler.clone() {
            Some(handler) => session_for(Some(handler))?,
            None => Arc::clone(&session),
        };

        info!(
            host = %session.host_address(),
            separate_v3 = !Arc::ptr_eq(&session, &v3_session),
            "SDK client ready"
        );
        Ok(SdkClient { session, v3_session })
    }
}
