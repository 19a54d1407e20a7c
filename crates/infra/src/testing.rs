//! Mock transport for unit tests
//!
//! Replays scripted results in order and records every request it is sent.
//! Once the script runs out it answers `200 {}`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use vaultline_domain::{ApiResponse, HttpRequest, Result};

use crate::http::{Session, Transport};

#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<ApiResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn with(results: Vec<Result<ApiResponse>>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(results.into()), requests: Mutex::default() })
    }

    pub fn empty() -> Arc<Self> {
        Self::with(Vec::new())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().last().cloned().expect("no request was sent")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<ApiResponse> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, request.url.clone(), "{}")))
    }
}

/// Session without auth on `https://console.example.com` backed by `transport`.
pub fn session_on(transport: Arc<MockTransport>) -> Arc<Session> {
    Arc::new(
        Session::builder("console.example.com")
            .transport(transport)
            .build()
            .expect("session builds"),
    )
}

/// Value of the query parameter `key`, if it was sent.
pub fn param<'a>(request: &'a HttpRequest, key: &str) -> Option<&'a str> {
    request.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}
