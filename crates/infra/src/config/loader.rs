//! Settings loader
//!
//! Loads [`SdkSettings`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. Only if `VAULTLINE_DEBUG_LEVEL` is absent, falls back to loading from
//!    file; an invalid environment is an error, not a fallback
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `VAULTLINE_DEBUG_LEVEL`: `none`/`info`/`debug`/`trace` or `0`..`3`
//!   (required for the environment to count as a configuration source)
//! - `VAULTLINE_VERIFY_TLS`: Whether to verify TLS certificates (true/false)
//! - `VAULTLINE_HTTP_PROXY`: Proxy URL for `http://` requests
//! - `VAULTLINE_HTTPS_PROXY`: Proxy URL for `https://` requests
//! - `VAULTLINE_ITEMS_PER_PAGE`: Default page size for list endpoints
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./vaultline.json` or `./vaultline.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};
use std::str::FromStr;

use vaultline_domain::{DebugLevel, ProxySettings, Result, SdkError, SdkSettings};

const DEBUG_LEVEL_VAR: &str = "VAULTLINE_DEBUG_LEVEL";

/// Load settings with automatic fallback strategy
///
/// # Errors
/// Returns `SdkError::Config` if the environment holds invalid values, or if
/// it is not configured and no valid settings file is found.
pub fn load() -> Result<SdkSettings> {
    if std::env::var_os(DEBUG_LEVEL_VAR).is_none() {
        tracing::debug!("{} not set, loading settings from file", DEBUG_LEVEL_VAR);
        return load_from_file(None);
    }

    let settings = load_from_env()?;
    tracing::info!("Settings loaded from environment variables");
    Ok(settings)
}

/// Load settings from environment variables
///
/// Only `VAULTLINE_DEBUG_LEVEL` is required; the rest fall back to
/// [`SdkSettings::default`].
///
/// # Errors
/// Returns `SdkError::Config` if the debug level is missing or any variable
/// holds an invalid value.
pub fn load_from_env() -> Result<SdkSettings> {
    let defaults = SdkSettings::default();

    let debug_level = parse_debug_level(&env_var(DEBUG_LEVEL_VAR)?)?;
    let verify_tls = env_bool("VAULTLINE_VERIFY_TLS", defaults.verify_tls);
    let proxies = ProxySettings {
        http: std::env::var("VAULTLINE_HTTP_PROXY").ok(),
        https: std::env::var("VAULTLINE_HTTPS_PROXY").ok(),
    };
    let items_per_page = match std::env::var("VAULTLINE_ITEMS_PER_PAGE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| SdkError::Config(format!("Invalid items per page: {}", e)))?,
        Err(_) => defaults.items_per_page,
    };

    Ok(SdkSettings { debug_level, verify_tls, proxies, items_per_page })
}

/// Load settings from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `SdkError::Config` if the file is missing, unreadable, or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<SdkSettings> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SdkError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SdkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading settings from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SdkError::Config(format!("Failed to read config file: {}", e)))?;

    parse_settings(&contents, &config_path)
}

/// Parse settings from string content, detecting the format by extension.
fn parse_settings(contents: &str, path: &Path) -> Result<SdkSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SdkError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SdkError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SdkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a settings file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let names = ["vaultline.json", "vaultline.toml", "config.json", "config.toml"];

    [cwd.clone(), cwd.join("..")]
        .iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Accepts level names or their numeric form.
fn parse_debug_level(raw: &str) -> Result<DebugLevel> {
    if let Ok(number) = raw.trim().parse::<u8>() {
        return DebugLevel::from_number(number)
            .ok_or_else(|| SdkError::Config(format!("Invalid debug level: {}", raw)));
    }
    DebugLevel::from_str(raw).map_err(SdkError::Config)
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SdkError::Config(format!("Missing required environment variable: {}", key)))
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
