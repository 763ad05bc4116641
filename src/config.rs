//! Client configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application API base URL
    pub api_base_url: String,
    /// Auth provider base URL
    pub auth_url: String,
    /// Publishable auth API key, sent as the `apikey` header
    pub auth_api_key: String,
    /// Per-request timeout applied to every HTTP call
    pub request_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            auth_url: "http://localhost:54321".to_string(),
            auth_api_key: "test_publishable_key".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let timeout_secs = match env::var("ATLAS_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "Invalid ATLAS_REQUEST_TIMEOUT_SECS, using default"
                );
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: env::var("ATLAS_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("ATLAS_API_BASE_URL"))?,
            auth_url: env::var("ATLAS_AUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("ATLAS_AUTH_URL"))?,
            auth_api_key: env::var("ATLAS_AUTH_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ATLAS_AUTH_KEY"))?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
