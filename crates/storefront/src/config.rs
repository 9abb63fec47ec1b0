//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HOOPSHOP_BASE_URL` - Public URL for the storefront (https enables secure cookies)
//!
//! ## Optional
//! - `HOOPSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `HOOPSHOP_PORT` - Listen port (default: 3000)
//! - `HOOPSHOP_API_URL` - Remote shop API origin (default: <https://thay-shop.onrender.com>)
//! - `HOOPSHOP_API_TIMEOUT_SECS` - Per-request timeout for API calls (default: 15)
//! - `HOOPSHOP_CACHE_TTL_SECS` - Lifetime of cached catalog lists (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Origin of the hosted shop API.
pub const DEFAULT_API_URL: &str = "https://thay-shop.onrender.com";

const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Remote shop API configuration
    pub api: ApiConfig,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Remote shop API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin every `/api/...` path is resolved against
    pub base_url: Url,
    /// Timeout applied to each API request
    pub timeout: Duration,
    /// How long cached list responses stay fresh
    pub cache_ttl: Duration,
}

impl ApiConfig {
    /// API configuration with default timeout and cache lifetime.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Sentry settings. Sentry stays disabled without a DSN.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("HOOPSHOP_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("HOOPSHOP_PORT", "3000")?;
        let base_url = get_required_env("HOOPSHOP_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("HOOPSHOP_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            host,
            port,
            base_url,
            api: ApiConfig::from_env()?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls cookie `Secure`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("HOOPSHOP_API_URL", DEFAULT_API_URL);
        let base_url = parse_api_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("HOOPSHOP_API_URL".to_string(), e))?;
        let timeout = parse_env_or_default::<u64>(
            "HOOPSHOP_API_TIMEOUT_SECS",
            &DEFAULT_API_TIMEOUT_SECS.to_string(),
        )?;
        let cache_ttl = parse_env_or_default::<u64>(
            "HOOPSHOP_CACHE_TTL_SECS",
            &DEFAULT_CACHE_TTL_SECS.to_string(),
        )?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env_or_default::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API origin. Only http(s) URLs with a host are accepted.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, falling back to `default`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            api: ApiConfig::new(Url::parse(DEFAULT_API_URL).unwrap()),
            sentry: SentryConfig::default(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://shop.example.com").is_secure());
    }

    #[test]
    fn test_parse_api_url_accepts_http_and_https() {
        assert!(parse_api_url("https://thay-shop.onrender.com").is_ok());
        assert!(parse_api_url("http://127.0.0.1:4000").is_ok());
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        let err = parse_api_url("ftp://files.example.com").unwrap_err();
        assert!(err.contains("ftp"));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_api_config_defaults() {
        let api = ApiConfig::new(Url::parse(DEFAULT_API_URL).unwrap());
        assert_eq!(api.timeout, Duration::from_secs(15));
        assert_eq!(api.cache_ttl, Duration::from_secs(300));
    }
}
