//! Configuration Module
//!
//! Handles loading and validating proxy configuration from environment variables.

use std::env;

use crate::error::{ProxyError, Result};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing Redis host
    pub redis_host: String,
    /// Backing Redis port
    pub redis_port: u16,
    /// Backing Redis password, None = no AUTH
    pub redis_password: Option<String>,
    /// Maximum number of cached keys; must not be negative
    pub cache_capacity: i64,
    /// Milliseconds after its last touch before a cached key goes stale; must not be negative
    pub cache_ttl_ms: i64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_HOST` - Backing Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Backing Redis port (default: 6379)
    /// - `REDIS_PASSWORD` - Backing Redis password (default: unset)
    /// - `CACHE_CAPACITY` - Maximum cached keys (default: 1000)
    /// - `CACHE_TTL_MS` - Cache expiry in milliseconds (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: env::var("REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.redis_port),
            redis_password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            cache_ttl_ms: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Rejects negative cache settings.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity < 0 {
            return Err(ProxyError::InvalidArgument(format!(
                "CACHE_CAPACITY must not be negative, got {}",
                self.cache_capacity
            )));
        }
        if self.cache_ttl_ms < 0 {
            return Err(ProxyError::InvalidArgument(format!(
                "CACHE_TTL_MS must not be negative, got {}",
                self.cache_ttl_ms
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_password: None,
            cache_capacity: 1000,
            cache_ttl_ms: 60_000,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.redis_host, "127.0.0.1");
        assert_eq!(config.redis_port, 6379);
        assert!(config.redis_password.is_none());
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.cache_ttl_ms, 60_000);
        assert_eq!(config.server_port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        for var in [
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_PASSWORD",
            "CACHE_CAPACITY",
            "CACHE_TTL_MS",
            "SERVER_PORT",
        ] {
            env::remove_var(var);
        }
        let config = Config::from_env();
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.cache_capacity, 1000);

        env::set_var("CACHE_CAPACITY", "-5");
        env::set_var("CACHE_TTL_MS", "250");
        env::set_var("REDIS_PASSWORD", "");
        env::set_var("REDIS_PORT", "not-a-port");
        let config = Config::from_env();
        assert_eq!(config.cache_capacity, -5);
        assert_eq!(config.cache_ttl_ms, 250);
        assert!(config.redis_password.is_none());
        assert_eq!(config.redis_port, 6379);

        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_TTL_MS");
        env::remove_var("REDIS_PASSWORD");
        env::remove_var("REDIS_PORT");
    }

    #[test]
    fn test_validate_rejects_negative_capacity() {
        let config = Config {
            cache_capacity: -1,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ProxyError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_rejects_negative_ttl() {
        let config = Config {
            cache_ttl_ms: -1,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ProxyError::InvalidArgument(_))));
    }
}
