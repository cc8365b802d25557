//! Client configuration.
//!
//! The only outside knob is the assistant service base URL, overridable with
//! `RECRUITER_CHAT_API_URL`.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "RECRUITER_CHAT_API_URL";

/// Base URL used when no override is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL with a host.
    #[error("Invalid base URL {0:?}: expected http(s)://host[:port][/path]")]
    InvalidBaseUrl(String),
    /// The request timeout is zero.
    #[error("Invalid request timeout")]
    InvalidTimeout,
}

/// Assistant service client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the assistant service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns error if the override is not a usable http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    ///
    /// # Errors
    /// Returns error if the override is not a usable http(s) URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    /// Use a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL for an endpoint path such as `/api/chat`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rest = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"))
            .ok_or_else(|| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CHAT_PATH;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.endpoint(CHAT_PATH), "http://localhost:8000/api/chat");
    }

    #[test]
    fn test_env_override() {
        let config = ClientConfig::from_lookup(|key| {
            (key == BASE_URL_ENV).then(|| "https://chat.example.com/backend/".to_string())
        })
        .unwrap();

        assert_eq!(
            config.endpoint(CHAT_PATH),
            "https://chat.example.com/backend/api/chat"
        );
    }

    #[test]
    fn test_blank_override_falls_back() {
        let config = ClientConfig::from_lookup(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        for bad in ["localhost:8000", "ftp://host", "http://", "http:///api"] {
            let result = ClientConfig::from_lookup(|_| Some(bad.to_string()));
            assert_eq!(
                result,
                Err(ConfigError::InvalidBaseUrl(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://10.0.0.2:9000"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }
}
