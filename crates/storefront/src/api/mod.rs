//! REST backend client.
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is stored locally
//! - Every response is wrapped in `{status, message, typeError, data}`; the
//!   client unwraps it into `Result<T, ApiError>`
//! - Read endpoints are cached in-memory via `moka` (5 minute TTL); mutation
//!   methods invalidate the entries they make stale themselves
//! - Authenticated calls carry the signed-in user's access token as a bearer
//!   token
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config.api)?;
//!
//! let products = client.public_products().await?;
//! let orders = client.my_orders(&user, ListParams::default()).await?;
//! ```

mod auth;
mod cache;
mod catalog;
mod orders;

pub use auth::LoginResponse;
pub use cache::{CacheKey, CacheValue};
pub use orders::CreatedOrder;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

/// Cache TTL for read endpoints.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached responses.
const CACHE_CAPACITY: u64 = 1000;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend rejected the request.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        type_error: Option<String>,
    },

    /// Access token missing, invalid or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Text safe to show a shopper.
    ///
    /// Backend business-rule messages are passed through; everything else
    /// collapses to `fallback`.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => message,
            _ => fallback,
        }
    }
}

/// Backend response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    message: String,
    #[serde(default)]
    type_error: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Client for the App Shop REST backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .support_invalidation_closures()
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and unwrap the envelope's `data` into `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let mut request = self.inner.client.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        debug!(%method, path, status = status.as_u16(), "Backend response");

        let envelope = serde_json::from_str::<Envelope>(&response_text);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            let message = envelope.map(|e| e.message).unwrap_or_default();
            return Err(ApiError::NotFound(if message.is_empty() {
                path.to_string()
            } else {
                message
            }));
        }
        if !status.is_success() {
            let (message, type_error) = match envelope {
                Ok(e) => (e.message, e.type_error),
                Err(_) => (response_text.chars().take(200).collect(), None),
            };
            tracing::warn!(
                status = status.as_u16(),
                message = %message,
                type_error = ?type_error,
                "Backend returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
                type_error,
            });
        }

        let envelope = envelope.map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend envelope"
            );
            e
        })?;
        Ok(serde_json::from_value(
            envelope.data.unwrap_or(serde_json::Value::Null),
        )?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, query, token, None).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, &[], token, body).await
    }

    /// Cache lookup.
    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let hit = self.inner.cache.get(key).await;
        if hit.is_some() {
            debug!(?key, "Cache hit");
        }
        hit
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Drop every cached entry matching `predicate`.
    fn forget_where<F>(&self, predicate: F)
    where
        F: Fn(&CacheKey) -> bool + Send + Sync + 'static,
    {
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(move |key, _| predicate(key))
        {
            tracing::error!(error = %e, "Failed to invalidate cache entries");
        }
    }

    /// Check that the backend answers at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.inner.client.get(self.url("", &[])?).send().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: Url::parse("http://localhost:8080/api/").unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_and_encodes_query() {
        let url = client()
            .url("/orders/me", &[("limit", "-1".to_string()), ("search", "a b".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/orders/me?limit=-1&search=a+b"
        );
    }

    #[test]
    fn test_user_message_passes_backend_text_only() {
        let api = ApiError::Api {
            status: 400,
            message: "Product is out of stock".to_string(),
            type_error: Some("INVALID".to_string()),
        };
        assert_eq!(api.user_message("fallback"), "Product is out of stock");
        assert_eq!(ApiError::Unauthorized.user_message("fallback"), "fallback");

        let blank = ApiError::Api {
            status: 500,
            message: "  ".to_string(),
            type_error: None,
        };
        assert_eq!(blank.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let envelope: Envelope = serde_json::from_str(r#"{"status":"Success"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.message.is_empty());
    }
}
