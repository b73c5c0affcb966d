//! App Shop admin library.
//!
//! The back-office: role management behind permission-gated pages. Kept as a
//! library so the router can be driven in-process by the integration tests.
//!
//! # Security
//!
//! Every page except sign-in and the health probes sits behind a
//! [`PagePolicy`](app_shop_core::access::PagePolicy) guard, and the backend
//! re-checks the bearer token on every call.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{Router, middleware::from_fn};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Upper bound for one request, backend calls included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the admin router with every middleware layer applied.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(from_fn(middleware::session_expiry_middleware))
        .layer(session_layer)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "admin_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        admin_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::{ApiConfig, AdminConfig};

    /// An app whose backend refuses every connection.
    fn offline_app() -> Router {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: url::Url::parse("http://localhost/").unwrap(),
            api: ApiConfig {
                base_url: url::Url::parse("http://127.0.0.1:9/").unwrap(),
                timeout: Duration::from_secs(2),
            },
            default_locale: app_shop_core::user::Locale::Vi,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        app(AppState::new(config).unwrap())
    }

    async fn status_of(uri: &str) -> StatusCode {
        offline_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_liveness_ignores_backend() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_backend() {
        assert_eq!(status_of("/health/ready").await, StatusCode::SERVICE_UNAVAILABLE);
    }
}
