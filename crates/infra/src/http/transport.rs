use std::time::Duration;

use reqwest::blocking::Client as ReqwestClient;
use reqwest::{Method, Proxy};
use tracing::debug;
use vaultline_domain::{ApiResponse, HttpMethod, HttpRequest, PoolConfig, Result, SdkSettings};

use crate::errors::InfraError;

/// Executes one prepared HTTP exchange.
///
/// Implementations report only transport-level failures as errors; any
/// response the server sends, including 4xx/5xx, comes back as `Ok`.
pub trait Transport: Send + Sync {
    /// Send the request and read the full response body.
    ///
    /// # Errors
    /// Returns `SdkError::Transport` when no response could be obtained.
    fn send(&self, request: &HttpRequest) -> Result<ApiResponse>;
}

/// Blocking reqwest transport with a pooled client shared by all requests.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    default_timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Build a transport from process settings and pool bounds.
    pub fn from_settings(settings: &SdkSettings, pool: &PoolConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout())
            .verify_tls(settings.verify_tls);

        if let Some(timeout) = pool.default_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &settings.proxies.http {
            builder = builder.http_proxy(proxy.clone());
        }
        if let Some(proxy) = &settings.proxies.https {
            builder = builder.https_proxy(proxy.clone());
        }

        builder.build()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<ApiResponse> {
        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout.or(self.default_timeout) {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().map_err(InfraError::from)?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();
        let body = response.text().map_err(InfraError::from)?;

        debug!(%status, %url, bytes = body.len(), "received HTTP response");

        Ok(ApiResponse { status, url, headers, body })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Duration,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
    verify_tls: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            timeout: None,
            pool_max_idle_per_host: pool.max_idle_per_host,
            pool_idle_timeout: pool.idle_timeout(),
            http_proxy: None,
            https_proxy: None,
            verify_tls: true,
        }
    }
}

impl ReqwestTransportBuilder {
    /// Timeout applied to requests that do not carry their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Explicit proxies replace the ones reqwest reads from `HTTP_PROXY` and
    /// `HTTPS_PROXY`; without them the environment proxies apply.
    pub fn http_proxy(mut self, url: impl Into<String>) -> Self {
        self.http_proxy = Some(url.into());
        self
    }

    pub fn https_proxy(mut self, url: impl Into<String>) -> Self {
        self.https_proxy = Some(url.into());
        self
    }

    /// Disable only for self-signed test servers.
    pub fn verify_tls(mut self, enabled: bool) -> Self {
        self.verify_tls = enabled;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .gzip(true)
            .deflate(true)
            // The session owns the timeout decision per request.
            .timeout(None::<Duration>);

        if let Some(url) = self.http_proxy {
            builder = builder.proxy(Proxy::http(url).map_err(InfraError::from)?);
        }
        if let Some(url) = self.https_proxy {
            builder = builder.proxy(Proxy::https(url).map_err(InfraError::from)?);
        }
        if !self.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(InfraError::from)?;

        Ok(ReqwestTransport { client, default_timeout: self.timeout })
    }
}
