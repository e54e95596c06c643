//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TOKEN_FILE: &str = ".cycle/session.json";
pub const DEFAULT_HEALTH_POLL_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token_file: PathBuf,
    pub poll_interval: Duration,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            poll_interval: Duration::from_millis(DEFAULT_HEALTH_POLL_MS),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CYCLE_API_BASE_URL`: default `http://localhost:8080/api`
    /// - `CYCLE_TOKEN_FILE`: default `.cycle/session.json`
    /// - `CYCLE_HEALTH_POLL_MS`: default 5000, must be non-zero
    /// - `CYCLE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CYCLE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the poll interval is zero.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("CYCLE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let token_file = std::env::var("CYCLE_TOKEN_FILE").unwrap_or_else(|_| DEFAULT_TOKEN_FILE.to_string());
        let poll_ms = env_parse("CYCLE_HEALTH_POLL_MS", DEFAULT_HEALTH_POLL_MS);
        if poll_ms == 0 {
            return Err(ClientError::Config("CYCLE_HEALTH_POLL_MS must be greater than zero".into()));
        }
        let timeouts = Timeouts {
            request_secs: env_parse("CYCLE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("CYCLE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            token_file: PathBuf::from(token_file),
            poll_interval: Duration::from_millis(poll_ms),
            timeouts,
        })
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<String>, token_file: Option<PathBuf>) -> Self {
        if let Some(url) = base_url {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(path) = token_file {
            self.token_file = path;
        }
        self
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
