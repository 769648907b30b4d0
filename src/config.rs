//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Upstream REST API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidValue(format!("API_URL '{}': {}", base_url, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(format!(
                "API_URL must be http(s), got '{}'",
                base_url.scheme()
            )));
        }

        Ok(Self { base_url, timeout })
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Default)]
pub struct CookieConfig {
    /// Mark cookies `Secure` (production only)
    pub secure: bool,
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub cookie: CookieConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        // API_URL wins; NEXT_PUBLIC_API_URL is honoured for existing deployments
        let base_url = std::env::var("API_URL")
            .or_else(|_| std::env::var("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|_| ApiConfig::DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(ApiConfig::DEFAULT_TIMEOUT_SECS);

        let api = ApiConfig::new(&base_url, Duration::from_secs(timeout_secs))?;

        let cookie = CookieConfig {
            secure: std::env::var("APP_ENV")
                .map(|env| Self::is_production(&env))
                .unwrap_or(false),
        };

        Ok(Self {
            server,
            api,
            cookie,
        })
    }

    fn is_production(env: &str) -> bool {
        env.trim().eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_api_config_accepts_http_url() {
        let config = ApiConfig::new("https://api.indibiz.test/v1", Duration::from_secs(10)).unwrap();
        assert_eq!(config.base_url.host_str(), Some("api.indibiz.test"));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_config_rejects_garbage() {
        assert!(ApiConfig::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiConfig::new("ftp://files.example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_is_production() {
        assert!(Settings::is_production("production"));
        assert!(Settings::is_production(" Production "));
        assert!(!Settings::is_production("development"));
    }
}
