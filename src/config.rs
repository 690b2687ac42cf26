//! Application configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the hosted backend, without a trailing slash.
    pub backend_url: String,
    /// Service API key sent with every backend request.
    pub backend_api_key: String,
    /// Directory for the durable session cache. `None` disables it.
    pub state_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_URL`
    /// - `BACKEND_API_KEY`
    ///
    /// Optional:
    /// - `STATE_DIR`: session cache directory (cache disabled when absent)
    /// - `REQUEST_TIMEOUT_SECS`: default 30
    /// - `CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = std::env::var("BACKEND_URL")
            .map_err(|_| ConfigError::MissingVar("BACKEND_URL"))?
            .trim_end_matches('/')
            .to_string();
        let backend_api_key =
            std::env::var("BACKEND_API_KEY").map_err(|_| ConfigError::MissingVar("BACKEND_API_KEY"))?;
        let state_dir = std::env::var("STATE_DIR").ok().map(PathBuf::from);

        Ok(Self {
            backend_url,
            backend_api_key,
            state_dir,
            request_timeout_secs: env_parse_u64("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_u64("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
