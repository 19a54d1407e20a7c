//! Authenticated HTTP session
//!
//! A `Session` is bound to one host. It resolves relative URLs against that
//! host, applies the default headers, and runs every request through a
//! bounded retry loop that re-authenticates once when the auth handler flags
//! a response as unauthorized.
//!
//! # Error routing
//! All failures (transport, auth exhaustion, 4xx/5xx, success-callback
//! errors) leave through one choke point. With an error callback the error is
//! handed to it and the call yields `Ok(None)`; without one the error's trace
//! goes to the diagnostics sink and the error is returned.
//!
//! # Concurrency
//! `Session` is `Send + Sync` and meant to be shared. Re-authentication uses
//! double-checked locking on `valid_auth`, so concurrent callers that find
//! auth invalid trigger a single refresh.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace, warn};
use url::{Position, Url};
use vaultline_domain::constants::{DEFAULT_SCHEME, JSON_CONTENT_TYPE, KEEP_ALIVE, MAX_TRIES};
use vaultline_domain::{
    ApiResponse, DebugLevel, HttpMethod, HttpRequest, PoolConfig, RequestOptions, Result,
    SdkError, SdkSettings,
};

use super::transport::{ReqwestTransport, Transport};
use crate::auth::AuthHandler;
use crate::errors::InfraError;
use crate::observability::{render_trace, DiagnosticsSink, NoopDiagnostics};

/// Callback run with a successful response.
pub type SuccessCallback<'a> = Box<dyn FnOnce(&ApiResponse) -> Result<()> + 'a>;

/// Callback that takes ownership of a request error instead of the caller.
pub type ErrorCallback<'a> = Box<dyn FnOnce(SdkError) + 'a>;

/// Optional success/error callbacks for [`Session::request_with`].
#[derive(Default)]
pub struct RequestCallbacks<'a> {
    on_success: Option<SuccessCallback<'a>>,
    on_error: Option<ErrorCallback<'a>>,
}

impl<'a> RequestCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` with the response when the exchange succeeds. An `Err`
    /// from the callback is routed like any other request error.
    pub fn then<F, E>(mut self, callback: F) -> Self
    where
        F: FnOnce(&ApiResponse) -> std::result::Result<(), E> + 'a,
        E: fmt::Display,
    {
        self.on_success = Some(Box::new(move |response: &ApiResponse| {
            callback(response).map_err(|err| SdkError::Callback(err.to_string()))
        }));
        self
    }

    /// Hand any error to `callback`; the request then yields `Ok(None)`.
    pub fn catch<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(SdkError) + 'a,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Per-host HTTP session with lazy, thread-safe re-authentication.
pub struct Session {
    host_address: String,
    base_url: Url,
    transport: Arc<dyn Transport>,
    auth_handler: Option<Arc<dyn AuthHandler>>,
    valid_auth: AtomicBool,
    auth_lock: Mutex<()>,
    headers: RwLock<Vec<(String, String)>>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    settings: SdkSettings,
    max_tries: u32,
}

impl Session {
    /// Start building a session for `host`.
    pub fn builder(host: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(host)
    }

    /// Session with default settings, pool, and transport.
    ///
    /// # Errors
    /// Returns `SdkError::InvalidUrl` for an unparseable host and
    /// `SdkError::Transport` if the HTTP client cannot be built.
    pub fn new(
        host: impl Into<String>,
        auth_handler: Option<Arc<dyn AuthHandler>>,
    ) -> Result<Self> {
        let mut builder = Self::builder(host);
        if let Some(handler) = auth_handler {
            builder = builder.auth_handler(handler);
        }
        builder.build()
    }

    /// Host address including its scheme.
    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn settings(&self) -> &SdkSettings {
        &self.settings
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    pub fn is_auth_valid(&self) -> bool {
        self.valid_auth.load(Ordering::Acquire)
    }

    /// Force the next request to re-authenticate first.
    pub fn invalidate_auth(&self) {
        self.valid_auth.store(false, Ordering::Release);
    }

    /// Set (or replace) a session header sent with every request.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut headers = self.headers.write();
        match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => headers.push((name, value)),
        }
    }

    pub fn remove_header(&self, name: &str) {
        self.headers.write().retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .read()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    /// Snapshot of the session headers.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers.read().clone()
    }

    /// Join `url` onto the host address with standard URL-join rules: an
    /// absolute path replaces the host's path, an absolute URL wins outright.
    ///
    /// # Errors
    /// Returns `SdkError::InvalidUrl` if the join fails.
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        Ok(self.base_url.join(url).map_err(InfraError::from)?)
    }

    /// Refresh credentials if they are marked invalid.
    ///
    /// Check, lock, re-check, refresh, set. Callers that lose the race for
    /// the lock find the flag already set and return without refreshing.
    ///
    /// # Errors
    /// Returns whatever the auth handler's refresh step returns; the flag
    /// stays invalid in that case.
    pub fn ensure_authenticated(&self) -> Result<()> {
        let Some(handler) = &self.auth_handler else {
            return Ok(());
        };
        if self.valid_auth.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.auth_lock.lock();
        if !self.valid_auth.load(Ordering::Acquire) {
            debug!(host = %self.host_address, "refreshing credentials");
            handler.handle_unauthorized(self)?;
            self.valid_auth.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Issue a request and return the successful response.
    ///
    /// Failures are reported to the diagnostics sink and returned.
    ///
    /// # Errors
    /// - `SdkError::Transport` when no response was received (never retried)
    /// - `SdkError::Unauthorized` when every attempt was flagged unauthorized
    /// - `SdkError::Http` for any other status >= 400
    /// - `SdkError::Auth` or the handler's error when refreshing fails
    /// - `SdkError::InvalidUrl` when `url` cannot be joined onto the host
    #[instrument(skip(self, options), fields(method = %method, url = %url))]
    pub fn request(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        self.execute(method, url, &options).map_err(|error| self.report(method, url, error))
    }

    /// Callback form of [`Session::request`].
    ///
    /// Returns `Ok(Some(response))` on success. When an error callback is
    /// present it receives any error and the call returns `Ok(None)`.
    ///
    /// # Errors
    /// Without an error callback, the same errors as [`Session::request`]
    /// plus `SdkError::Callback` when the success callback fails.
    #[instrument(skip(self, options, callbacks), fields(method = %method, url = %url))]
    pub fn request_with(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
        callbacks: RequestCallbacks<'_>,
    ) -> Result<Option<ApiResponse>> {
        let RequestCallbacks { on_success, on_error } = callbacks;

        let response = match self.execute(method, url, &options) {
            Ok(response) => response,
            Err(error) => return self.handle_error(method, url, error, on_error),
        };

        if let Some(then) = on_success {
            if let Err(error) = then(&response) {
                return self.handle_error(method, url, error, on_error);
            }
        }

        Ok(Some(response))
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(HttpMethod::Get, url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(HttpMethod::Post, url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(HttpMethod::Put, url, options)
    }

    pub fn patch(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(HttpMethod::Patch, url, options)
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(HttpMethod::Delete, url, options)
    }

    // At most `max_tries` HTTP attempts. Only an unauthorized response with
    // attempts left is retried.
    fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        let target = self.resolve_url(url)?;
        let mut tries = 0;

        loop {
            self.ensure_authenticated()?;

            let request = self.prepare(method, &target, options);
            self.trace_request(&request);

            let response = self.transport.send(&request)?;
            tries += 1;

            let unauthorized = self
                .auth_handler
                .as_ref()
                .is_some_and(|handler| handler.response_indicates_unauthorized(&response));

            if unauthorized {
                if tries < self.max_tries {
                    warn!(
                        attempt = tries,
                        status = response.status,
                        url = %target,
                        "unauthorized response, re-authenticating"
                    );
                    self.invalidate_auth();
                    continue;
                }
                return Err(SdkError::Unauthorized {
                    status: response.status,
                    url: target.to_string(),
                    attempts: tries,
                });
            }

            if response.is_error_status() {
                return Err(SdkError::Http {
                    status: response.status,
                    url: target.to_string(),
                    body: response.body,
                });
            }

            return Ok(response);
        }
    }

    fn prepare(&self, method: HttpMethod, target: &Url, options: &RequestOptions) -> HttpRequest {
        let mut headers = self.headers();
        for (name, value) in &options.headers {
            headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            method,
            url: target.to_string(),
            params: options.params.clone(),
            headers,
            body: options.body.clone(),
            timeout: options.timeout,
        }
    }

    fn trace_request(&self, request: &HttpRequest) {
        let level = self.settings.debug_level;
        if !level.will_print_for(DebugLevel::Info) {
            return;
        }

        info!("{:<8}{}", request.method.as_str(), request.url);
        if level.will_print_for(DebugLevel::Trace) {
            for (name, value) in &request.headers {
                let shown: &str =
                    if name.eq_ignore_ascii_case("authorization") { "<redacted>" } else { value };
                trace!(header = %name, value = %shown, "  headers");
            }
        }
        if level.will_print_for(DebugLevel::Debug) {
            for (name, value) in &request.params {
                debug!(param = %name, value = %value, "  params");
            }
            if let Some(body) = &request.body {
                debug!(body = %body, "  data");
            }
        }
    }

    fn handle_error(
        &self,
        method: HttpMethod,
        url: &str,
        error: SdkError,
        on_error: Option<ErrorCallback<'_>>,
    ) -> Result<Option<ApiResponse>> {
        match on_error {
            Some(catch) => {
                debug!(%method, %url, error = %error, "request error handled by callback");
                catch(error);
                Ok(None)
            }
            None => Err(self.report(method, url, error)),
        }
    }

    fn report(&self, method: HttpMethod, url: &str, error: SdkError) -> SdkError {
        self.diagnostics.report(&render_trace(method, url, &error));
        error
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host_address", &self.host_address)
            .field("has_auth_handler", &self.auth_handler.is_some())
            .field("valid_auth", &self.is_auth_valid())
            .field("max_tries", &self.max_tries)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    host: String,
    auth_handler: Option<Arc<dyn AuthHandler>>,
    transport: Option<Arc<dyn Transport>>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    settings: SdkSettings,
    pool: PoolConfig,
}

impl SessionBuilder {
    fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth_handler: None,
            transport: None,
            diagnostics: Arc::new(NoopDiagnostics),
            settings: SdkSettings::default(),
            pool: PoolConfig::default(),
        }
    }

    pub fn auth_handler(mut self, handler: Arc<dyn AuthHandler>) -> Self {
        self.auth_handler = Some(handler);
        self
    }

    /// Replace the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn settings(mut self, settings: SdkSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Pool bounds for the default transport; ignored with a custom one.
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn build(self) -> Result<Session> {
        let host_address = normalize_host(&self.host);
        let base_url = Url::parse(&host_address)
            .map_err(|err| SdkError::InvalidUrl(format!("{host_address}: {err}")))?;
        let host = netloc(&base_url);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_settings(&self.settings, &self.pool)?),
        };

        let headers = vec![
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("Host".to_string(), host),
            ("Connection".to_string(), KEEP_ALIVE.to_string()),
        ];

        let valid_auth = self.auth_handler.is_none();
        debug!(host = %host_address, auth = !valid_auth, "session created");

        Ok(Session {
            host_address,
            base_url,
            transport,
            auth_handler: self.auth_handler,
            valid_auth: AtomicBool::new(valid_auth),
            auth_lock: Mutex::new(()),
            headers: RwLock::new(headers),
            diagnostics: self.diagnostics,
            settings: self.settings,
            max_tries: MAX_TRIES,
        })
    }
}

fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{host}")
    }
}

// `user:pass@host:port`, the part between `//` and the path.
fn netloc(url: &Url) -> String {
    url[Position::BeforeUsername..Position::AfterPort].to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::testing::MockTransport;

    /// Treats 401 as unauthorized and stamps a fresh token on every refresh.
    #[derive(Default)]
    struct CountingAuth {
        refreshes: AtomicUsize,
        fail_refresh: bool,
        refresh_delay: Option<Duration>,
    }

    impl CountingAuth {
        fn refreshes(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    impl AuthHandler for CountingAuth {
        fn response_indicates_unauthorized(&self, response: &ApiResponse) -> bool {
            response.status == 401
        }

        fn handle_unauthorized(&self, session: &Session) -> Result<()> {
            if let Some(delay) = self.refresh_delay {
                std::thread::sleep(delay);
            }
            if self.fail_refresh {
                return Err(SdkError::Auth("bad credentials".into()));
            }
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            session.set_header("Authorization", format!("token-{n}"));
            Ok(())
        }
    }

    fn ok(status: u16) -> Result<ApiResponse> {
        Ok(ApiResponse::new(status, "https://console.example.com/api", r#"{"data":{}}"#))
    }

    fn session_with(
        transport: Arc<MockTransport>,
        auth: Option<Arc<CountingAuth>>,
    ) -> Session {
        let mut builder = Session::builder("console.example.com:4285").transport(transport);
        if let Some(auth) = auth {
            builder = builder.auth_handler(auth);
        }
        builder.build().unwrap()
    }

    fn recording_sink() -> (Arc<Mutex<Vec<String>>>, Arc<dyn DiagnosticsSink>) {
        let traces = Arc::new(Mutex::new(Vec::new()));
        let sink_traces = traces.clone();
        let sink: Arc<dyn DiagnosticsSink> =
            Arc::new(move |trace: &str| sink_traces.lock().push(trace.to_string()));
        (traces, sink)
    }

    #[test]
    fn host_without_scheme_gets_https() {
        let session = session_with(MockTransport::empty(), None);
        assert_eq!(session.host_address(), "https://console.example.com:4285");
    }

    #[test]
    fn host_with_scheme_is_kept() {
        let session = Session::builder("http://localhost:4280")
            .transport(MockTransport::empty())
            .build()
            .unwrap();
        assert_eq!(session.host_address(), "http://localhost:4280");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = Session::builder("exa mple.com")
            .transport(MockTransport::empty())
            .build()
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidUrl(_)));
    }

    #[test]
    fn default_headers_include_netloc_host() {
        let session = session_with(MockTransport::empty(), None);
        assert_eq!(session.header("accept").as_deref(), Some("application/json"));
        assert_eq!(session.header("Content-Type").as_deref(), Some("application/json"));
        assert_eq!(session.header("Host").as_deref(), Some("console.example.com:4285"));
        assert_eq!(session.header("Connection").as_deref(), Some("keep-alive"));
    }

    #[test]
    fn relative_urls_use_url_join_semantics() {
        let session = Session::builder("https://console.example.com/console/")
            .transport(MockTransport::empty())
            .build()
            .unwrap();

        assert_eq!(
            session.resolve_url("/api/Computer").unwrap().as_str(),
            "https://console.example.com/api/Computer"
        );
        assert_eq!(
            session.resolve_url("api/Computer").unwrap().as_str(),
            "https://console.example.com/console/api/Computer"
        );
        assert_eq!(
            session.resolve_url("https://other.example.com/api/User").unwrap().as_str(),
            "https://other.example.com/api/User"
        );
    }

    #[test]
    fn auth_flag_starts_valid_only_without_handler() {
        let without = session_with(MockTransport::empty(), None);
        assert!(without.is_auth_valid());

        let with = session_with(MockTransport::empty(), Some(Arc::default()));
        assert!(!with.is_auth_valid());
    }

    #[test]
    fn no_refresh_when_auth_starts_valid() {
        let transport = MockTransport::with(vec![ok(200)]);
        let session = session_with(transport.clone(), None);

        let response = session.get("/api/Computer", RequestOptions::new()).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.requests().len(), 1);
        assert!(session.header("Authorization").is_none());
    }

    #[test]
    fn first_request_authenticates_lazily() {
        let auth = Arc::new(CountingAuth::default());
        let transport = MockTransport::with(vec![ok(200)]);
        let session = session_with(transport.clone(), Some(auth.clone()));

        session.get("/api/User/my", RequestOptions::new()).unwrap();

        assert_eq!(auth.refreshes(), 1);
        assert!(session.is_auth_valid());
        let sent = transport.requests();
        assert!(sent[0].headers.contains(&("Authorization".to_string(), "token-1".to_string())));
    }

    #[test]
    fn unauthorized_then_ok_retries_once_with_one_refresh() {
        let auth = Arc::new(CountingAuth::default());
        let transport = MockTransport::with(vec![ok(200), ok(401), ok(200)]);
        let session = session_with(transport.clone(), Some(auth.clone()));
        session.get("/api/User/my", RequestOptions::new()).unwrap();
        let before = auth.refreshes();

        let response = session.get("/api/Computer", RequestOptions::new()).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(auth.refreshes() - before, 1);
        let sent = transport.requests();
        assert_eq!(sent.len(), 3);
        assert!(sent[2].headers.contains(&("Authorization".to_string(), "token-2".to_string())));
    }

    #[test]
    fn unauthorized_twice_exhausts_tries() {
        let auth = Arc::new(CountingAuth::default());
        let transport = MockTransport::with(vec![ok(401), ok(401), ok(200)]);
        let session = session_with(transport.clone(), Some(auth));

        let err = session.get("/api/Computer", RequestOptions::new()).unwrap_err();

        match err {
            SdkError::Unauthorized { status, attempts, url } => {
                assert_eq!(status, 401);
                assert_eq!(attempts, 2);
                assert_eq!(url, "https://console.example.com:4285/api/Computer");
            }
            other => panic!("expected unauthorized, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn unauthorized_flag_is_exhausted_even_for_success_status() {
        struct FlagEverything;
        impl AuthHandler for FlagEverything {
            fn response_indicates_unauthorized(&self, _response: &ApiResponse) -> bool {
                true
            }
            fn handle_unauthorized(&self, _session: &Session) -> Result<()> {
                Ok(())
            }
        }

        let transport = MockTransport::with(vec![ok(200), ok(200)]);
        let session = Session::builder("console.example.com")
            .transport(transport.clone())
            .auth_handler(Arc::new(FlagEverything))
            .build()
            .unwrap();

        let err = session.get("/api/Computer", RequestOptions::new()).unwrap_err();
        assert!(matches!(err, SdkError::Unauthorized { status: 200, attempts: 2, .. }));
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn transport_error_is_not_retried() {
        let auth = Arc::new(CountingAuth::default());
        let transport = MockTransport::with(vec![Err(SdkError::Transport("refused".into()))]);
        let session = session_with(transport.clone(), Some(auth.clone()));

        let err = session.get("/api/Computer", RequestOptions::new()).unwrap_err();

        assert!(matches!(err, SdkError::Transport(_)));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(auth.refreshes(), 1);
    }

    #[test]
    fn server_error_is_not_retried() {
        let auth = Arc::new(CountingAuth::default());
        let transport = MockTransport::with(vec![Ok(ApiResponse::new(500, "u", "oops"))]);
        let session = session_with(transport.clone(), Some(auth.clone()));

        let err = session.get("/api/Computer", RequestOptions::new()).unwrap_err();

        match err {
            SdkError::Http { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("expected http error, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(auth.refreshes(), 1);
        assert!(session.is_auth_valid());
    }

    #[test]
    fn refresh_failure_is_routed_and_flag_stays_invalid() {
        let auth = Arc::new(CountingAuth { fail_refresh: true, ..CountingAuth::default() });
        let transport = MockTransport::empty();
        let session = session_with(transport.clone(), Some(auth));

        let err = session.get("/api/Computer", RequestOptions::new()).unwrap_err();

        assert!(matches!(err, SdkError::Auth(_)));
        assert!(transport.requests().is_empty());
        assert!(!session.is_auth_valid());
    }

    #[test]
    fn error_callback_absorbs_error() {
        let transport = MockTransport::with(vec![ok(404)]);
        let (traces, sink) = recording_sink();
        let session = Session::builder("console.example.com")
            .transport(transport)
            .diagnostics(sink)
            .build()
            .unwrap();

        let mut caught = None;
        let result = session
            .request_with(
                HttpMethod::Get,
                "/api/Computer/42",
                RequestOptions::new(),
                RequestCallbacks::new().catch(|err| caught = Some(err)),
            )
            .unwrap();

        assert!(result.is_none());
        assert!(matches!(caught, Some(SdkError::Http { status: 404, .. })));
        assert!(traces.lock().is_empty());
    }

    #[test]
    fn unhandled_error_is_reported_then_returned() {
        let transport = MockTransport::with(vec![ok(500)]);
        let (traces, sink) = recording_sink();
        let session = Session::builder("console.example.com")
            .transport(transport)
            .diagnostics(sink)
            .build()
            .unwrap();

        let err = session
            .request_with(
                HttpMethod::Delete,
                "/api/ComputerBlock/7",
                RequestOptions::new(),
                RequestCallbacks::new(),
            )
            .unwrap_err();

        assert!(matches!(err, SdkError::Http { status: 500, .. }));
        let traces = traces.lock();
        assert_eq!(traces.len(), 1);
        assert!(traces[0].starts_with("DELETE /api/ComputerBlock/7: "));
    }

    #[test]
    fn success_callback_receives_response_and_call_returns_it() {
        let transport = MockTransport::with(vec![ok(200)]);
        let session = session_with(transport, None);

        let mut seen_status = 0;
        let result = session
            .request_with(
                HttpMethod::Get,
                "/api/Computer",
                RequestOptions::new(),
                RequestCallbacks::new().then(|response: &ApiResponse| {
                    seen_status = response.status;
                    Ok::<(), SdkError>(())
                }),
            )
            .unwrap();

        assert_eq!(seen_status, 200);
        assert_eq!(result.map(|r| r.status), Some(200));
    }

    #[test]
    fn failing_success_callback_takes_error_path() {
        let transport = MockTransport::with(vec![ok(200)]);
        let (traces, sink) = recording_sink();
        let session = Session::builder("console.example.com")
            .transport(transport)
            .diagnostics(sink)
            .build()
            .unwrap();

        let err = session
            .request_with(
                HttpMethod::Get,
                "/api/Computer",
                RequestOptions::new(),
                RequestCallbacks::new().then(|_response: &ApiResponse| Err("parse failed")),
            )
            .unwrap_err();

        assert!(matches!(err, SdkError::Callback(ref msg) if msg == "parse failed"));
        assert_eq!(traces.lock().len(), 1);
    }

    #[test]
    fn failing_success_callback_with_catch_returns_none() {
        let transport = MockTransport::with(vec![ok(200)]);
        let session = session_with(transport, None);

        let mut caught = None;
        let result = session
            .request_with(
                HttpMethod::Get,
                "/api/Computer",
                RequestOptions::new(),
                RequestCallbacks::new()
                    .then(|_response: &ApiResponse| Err("boom"))
                    .catch(|err| caught = Some(err)),
            )
            .unwrap();

        assert!(result.is_none());
        assert!(matches!(caught, Some(SdkError::Callback(_))));
    }

    #[test]
    fn per_request_headers_override_session_headers() {
        let transport = MockTransport::with(vec![ok(200)]);
        let session = session_with(transport.clone(), None);

        session
            .post(
                "/api/v4/legal-hold-policy/create",
                RequestOptions::new()
                    .header("content-type", "text/plain")
                    .param("idType", "guid")
                    .body("{}")
                    .timeout(Duration::from_secs(5)),
            )
            .unwrap();

        let sent = transport.requests();
        let request = &sent[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.params, vec![("idType".to_string(), "guid".to_string())]);
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        let content_types: Vec<_> = request
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "text/plain");
    }

    #[test]
    fn tracing_levels_do_not_change_outcome() {
        let transport = MockTransport::with(vec![ok(200)]);
        let session = Session::builder("console.example.com")
            .transport(transport)
            .settings(SdkSettings { debug_level: DebugLevel::Trace, ..SdkSettings::default() })
            .build()
            .unwrap();
        session.set_header("Authorization", "secret");

        let response = session
            .post("/api/LegalHold", RequestOptions::new().param("pgNum", 1).body("{}"))
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn concurrent_requests_refresh_once() {
        let auth = Arc::new(CountingAuth {
            refresh_delay: Some(Duration::from_millis(50)),
            ..CountingAuth::default()
        });
        let transport = MockTransport::empty();
        let session = session_with(transport.clone(), Some(auth.clone()));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    session.get("/api/Computer", RequestOptions::new()).unwrap();
                });
            }
        });

        assert_eq!(auth.refreshes(), 1);
        assert_eq!(transport.requests().len(), 8);
    }

    #[test]
    fn set_and_remove_header() {
        let session = session_with(MockTransport::empty(), None);
        session.set_header("Authorization", "a");
        session.set_header("authorization", "b");
        assert_eq!(session.header("AUTHORIZATION").as_deref(), Some("b"));
        assert_eq!(session.headers().len(), 5);

        session.remove_header("Authorization");
        assert!(session.header("Authorization").is_none());
    }
}
