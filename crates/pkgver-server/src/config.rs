//! Server configuration.

use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration for the tool server.
///
/// All fields have defaults; deployments override them through
/// `PKGVER_*` environment variables (or a deserialized settings blob in
/// embedding scenarios).
///
/// # Examples
///
/// ```
/// use pkgver_server::config::ServerConfig;
///
/// let config: ServerConfig = serde_json::from_str(r#"{"cache_ttl_secs": 60}"#).unwrap();
/// assert_eq!(config.cache_ttl_secs, 60);
/// assert_eq!(config.http_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// TTL for cached registry lookups, in seconds. Default 12 hours.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Per-request HTTP timeout, in seconds. Default 30.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// User agent sent on every registry request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    /// Builds a configuration from the environment, falling back to
    /// defaults for unset or unparseable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ttl) = env_u64("PKGVER_CACHE_TTL_SECS") {
            config.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = env_u64("PKGVER_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout;
        }
        if let Ok(user_agent) = std::env::var("PKGVER_USER_AGENT")
            && !user_agent.is_empty()
        {
            config.user_agent = user_agent;
        }

        config
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring unparseable {name}={raw}");
            None
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    pkgver_core::http::DEFAULT_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.cache_ttl_secs, 43_200);
        assert_eq!(config.http_timeout_secs, 30);
        assert!(config.user_agent.starts_with("pkgver/"));
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"http_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.cache_ttl_secs, 43_200);
    }

    #[test]
    fn test_durations() {
        let config = ServerConfig::default();
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.cache_ttl(), Duration::from_secs(43_200));
    }
}
