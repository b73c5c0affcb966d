//! REST backend client for the back-office.
//!
//! Same envelope handling as the storefront client; the cache holds role list
//! pages and role details, each with its own time to live (see
//! [`cache::CacheExpiry`]).

mod auth;
mod cache;
mod roles;

pub use auth::LoginResponse;
pub use cache::{CacheExpiry, CacheKey, CacheValue};

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

/// Maximum number of cached responses.
const CACHE_CAPACITY: u64 = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        type_error: Option<String>,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Backend business-rule message, or `fallback`.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => message,
            _ => fallback,
        }
    }
}

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
            .expire_after(CacheExpiry)
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

        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let message = envelope
                    .map(|e| e.message)
                    .ok()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| path.to_string());
                return Err(ApiError::NotFound(message));
            }
            s if !s.is_success() => {
                let (message, type_error) = match envelope {
                    Ok(e) => (e.message, e.type_error),
                    Err(_) => (response_text.chars().take(200).collect(), None),
                };
                tracing::warn!(
                    status = s.as_u16(),
                    message = %message,
                    type_error = ?type_error,
                    "Backend returned non-success status"
                );
                return Err(ApiError::Api {
                    status: s.as_u16(),
                    message,
                    type_error,
                });
            }
            _ => {}
        }

        let envelope = envelope?;
        Ok(serde_json::from_value(
            envelope.data.unwrap_or(serde_json::Value::Null),
        )?)
    }

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
    use std::time::Duration;

    use app_shop_core::pagination::ListParams;
    use app_shop_core::role::RoleListParams;

    use super::*;

    #[test]
    fn test_role_list_query_string() {
        let client = ApiClient::new(&ApiConfig {
            base_url: Url::parse("http://localhost:8080/api/").unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        let params = RoleListParams {
            order: "name asc".to_string(),
            search: String::new(),
            list: ListParams::page(2, 10),
        };
        let url = client.url("roles", &params.query_pairs()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/roles?order=name+asc&limit=10&page=2"
        );
    }
}
