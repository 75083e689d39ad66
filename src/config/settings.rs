//! Application settings loaded from a TOML file.
//!
//! The file is optional. Every field has a default, so a missing file or a
//! partial one both yield a usable [`AppConfig`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Number of wishes returned by the "latest" feed unless configured otherwise.
pub const DEFAULT_LAST_WISHES_LIMIT: u64 = 40;
/// Number of wishes returned by the "most copied" feed unless configured otherwise.
pub const DEFAULT_TOP_WISHES_LIMIT: u64 = 20;

const CONFIG_PATH_VAR: &str = "GIFTPOOL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

const fn default_last_wishes_limit() -> u64 {
    DEFAULT_LAST_WISHES_LIMIT
}

const fn default_top_wishes_limit() -> u64 {
    DEFAULT_TOP_WISHES_LIMIT
}

/// Tunables for the read feeds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Bound on the newest-first wish feed
    #[serde(default = "default_last_wishes_limit")]
    pub last_wishes_limit: u64,
    /// Bound on the most-copied wish feed
    #[serde(default = "default_top_wishes_limit")]
    pub top_wishes_limit: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_wishes_limit: DEFAULT_LAST_WISHES_LIMIT,
            top_wishes_limit: DEFAULT_TOP_WISHES_LIMIT,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Loads settings from `$GIFTPOOL_CONFIG` (or `./config.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No config file at {}, using defaults", path);
        return Ok(AppConfig::default());
    }
    tracing::debug!("Loading configuration from {}", path);
    load_config(&path)
}
