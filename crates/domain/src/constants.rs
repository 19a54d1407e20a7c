//! SDK constants
//!
//! Centralized location for the session defaults shared by the domain and
//! infrastructure crates.

// Session retry policy
pub const MAX_TRIES: u32 = 2;

// Connection pool defaults
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 500;
pub const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

// Paging
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 500;

// Default header values
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const KEEP_ALIVE: &str = "keep-alive";
pub const DEFAULT_SCHEME: &str = "https://";
