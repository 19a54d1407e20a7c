//! SDK configuration structures
//!
//! `SdkSettings` carries the process-wide knobs the session reads at
//! construction and request time. `PoolConfig` bounds the connection pool of
//! the default transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_POOL_IDLE_TIMEOUT_SECS, DEFAULT_POOL_MAX_IDLE_PER_HOST,
};
use crate::impl_keyword_conversions;

/// Verbosity of request tracing, ordered from quiet to chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    #[default]
    None = 0,
    Info = 1,
    Debug = 2,
    Trace = 3,
}

impl_keyword_conversions!(DebugLevel {
    None => "none",
    Info => "info",
    Debug => "debug",
    Trace => "trace",
});

impl DebugLevel {
    /// Map the numeric form (`0..=3`) used by older configs.
    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Info),
            2 => Some(Self::Debug),
            3 => Some(Self::Trace),
            _ => None,
        }
    }

    /// Whether output tagged with `level` should be emitted at this verbosity.
    pub fn will_print_for(self, level: DebugLevel) -> bool {
        self >= level
    }
}

/// Proxy URLs applied per scheme by the default transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxySettings {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Process-wide settings consumed by sessions and resource clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkSettings {
    pub debug_level: DebugLevel,
    pub verify_tls: bool,
    pub proxies: ProxySettings,
    pub items_per_page: u32,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::None,
            verify_tls: true,
            proxies: ProxySettings::default(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// Connection pool bounds for the default transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_idle_per_host: usize,
    pub idle_timeout_secs: u64,
    /// Applied when a request does not carry its own timeout
    pub default_timeout_secs: Option<u64>,
}

impl PoolConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            idle_timeout_secs: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            default_timeout_secs: None,
        }
    }
}
