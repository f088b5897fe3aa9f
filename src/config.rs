//! Configuration management for Pktime.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Environment variable holding the counter store endpoint URL.
pub const COUNTER_URL_ENV: &str = "UPSTASH_REDIS_REST_URL";
/// Environment variable holding the counter store access token.
pub const COUNTER_TOKEN_ENV: &str = "UPSTASH_REDIS_REST_TOKEN";

/// Main configuration for the Pktime service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PktimeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Networked counter store credentials
    #[serde(default)]
    pub counter_store: CounterStoreConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum requests allowed per window for one client
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_limit() -> u64 {
    crate::ratelimit::DEFAULT_LIMIT
}

fn default_window_secs() -> u64 {
    crate::ratelimit::DEFAULT_WINDOW_SECS
}

/// Credentials for the networked counter store.
///
/// When both the URL and token are present the service counts against the
/// networked store; otherwise it uses the in-memory fallback for the life of
/// the process. The choice is made once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterStoreConfig {
    /// REST endpoint URL
    #[serde(default)]
    pub url: Option<String>,

    /// Access token
    #[serde(default)]
    pub token: Option<String>,
}

impl CounterStoreConfig {
    /// Fill unset credentials from the environment.
    pub fn with_env(mut self) -> Self {
        if self.url.is_none() {
            self.url = read_env(COUNTER_URL_ENV);
        }
        if self.token.is_none() {
            self.token = read_env(COUNTER_TOKEN_ENV);
        }
        self
    }

    /// Return the endpoint and token when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.token.as_deref()) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl PktimeConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: PktimeConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::PktimeError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file is given,
    /// then pick up counter store credentials from the environment.
    pub fn load(path: Option<&str>) -> crate::error::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.counter_store = config.counter_store.with_env();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.rate_limiting.limit == 0 {
            return Err(crate::error::PktimeError::Config(
                "rate_limiting.limit must be a positive integer".to_string(),
            ));
        }
        if self.rate_limiting.window_secs == 0 {
            return Err(crate::error::PktimeError::Config(
                "rate_limiting.window_secs must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PktimeConfig::default();
        assert_eq!(config.rate_limiting.limit, 10);
        assert_eq!(config.rate_limiting.window_secs, 10);
        assert_eq!(config.server.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert!(config.counter_store.credentials().is_none());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: PktimeConfig = serde_yaml::from_str("rate_limiting:\n  limit: 5\n").unwrap();
        assert_eq!(config.rate_limiting.limit, 5);
        assert_eq!(config.rate_limiting.window_secs, 10);
    }

    #[test]
    fn test_credentials_require_both_values() {
        let partial = CounterStoreConfig {
            url: Some("https://counter.example.com".to_string()),
            token: None,
        };
        assert!(partial.credentials().is_none());

        let complete = CounterStoreConfig {
            url: Some("https://counter.example.com".to_string()),
            token: Some("secret".to_string()),
        };
        let (url, token) = complete.credentials().unwrap();
        assert_eq!(url, "https://counter.example.com");
        assert_eq!(token, "secret");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config: PktimeConfig = serde_yaml::from_str("rate_limiting:\n  limit: 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
