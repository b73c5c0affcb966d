//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (used by sitemap and robots)
//! - `API_BASE_URL` - Base URL of the REST backend
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `DEFAULT_LOCALE` - `vi` or `en` (default: vi)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use app_shop_core::user::Locale;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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
    pub base_url: Url,
    /// REST backend
    pub api: ApiConfig,
    /// Locale used when the browser sends nothing we support
    pub default_locale: Locale,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// REST backend connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Applied to every backend request.
    pub timeout: Duration,
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

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = parse_url("STOREFRONT_BASE_URL", &get_required_env("STOREFRONT_BASE_URL")?)?;
        let api = ApiConfig::from_env()?;
        let default_locale = parse_env("DEFAULT_LOCALE", "vi")?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            default_locale,
            sentry_dsn: get_optional_env("SENTRY_DSN").map(SecretString::from),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// The public site root without a trailing slash.
    #[must_use]
    pub fn site_root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_url("API_BASE_URL", &get_required_env("API_BASE_URL")?)?;
        let timeout_secs: u64 = parse_env("API_TIMEOUT_SECS", "10")?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an absolute http(s) URL. A trailing slash is added so relative
/// joins keep the full path.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url: Url = parse_value(key, &raw)?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: parse_url("STOREFRONT_BASE_URL", base_url).unwrap(),
            api: ApiConfig {
                base_url: parse_url("API_BASE_URL", "http://localhost:8080/api").unwrap(),
                timeout: Duration::from_secs(10),
            },
            default_locale: Locale::Vi,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_parse_url_appends_trailing_slash() {
        let url = parse_url("API_BASE_URL", "http://localhost:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        assert_eq!(
            url.join("orders/me").unwrap().as_str(),
            "http://localhost:8080/api/orders/me"
        );
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("API_BASE_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_url("API_BASE_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_value() {
        let port: u16 = parse_value("STOREFRONT_PORT", " 3000 ").unwrap();
        assert_eq!(port, 3000);
        let locale: Locale = parse_value("DEFAULT_LOCALE", "EN").unwrap();
        assert_eq!(locale, Locale::En);
        assert!(parse_value::<u16>("STOREFRONT_PORT", "abc").is_err());
    }

    #[test]
    fn test_site_root_and_secure_flag() {
        let plain = config("http://localhost:3000");
        assert_eq!(plain.site_root(), "http://localhost:3000");
        assert!(!plain.is_secure());

        let tls = config("https://shop.example/");
        assert_eq!(tls.site_root(), "https://shop.example");
        assert!(tls.is_secure());
    }

    #[test]
    fn test_debug_redacts_sentry_dsn() {
        let mut config = config("http://localhost:3000");
        config.sentry_dsn = Some(SecretString::from("https://key@sentry.example/1"));
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("key@sentry.example"));
    }
}
