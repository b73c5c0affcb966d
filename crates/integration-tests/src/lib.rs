//! Integration tests for App Shop.
//!
//! Both binaries are driven in-process: their routers are called with
//! `tower::ServiceExt::oneshot`, and their backend client talks to a
//! [`FakeBackend`] served by axum on an ephemeral local port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p app-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_*` - checkout, guards, sitemap
//! - `admin_*` - role management and its cache

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

pub mod backend;
pub mod client;

use std::time::Duration;

use app_shop_core::user::Locale;
use axum::Router;
use url::Url;

pub use backend::{FakeBackend, PASSWORD, SHOPPER, STAFF, VIEWER};
pub use client::{TestClient, TestResponse};

/// Backend request timeout used by both apps under test.
const API_TIMEOUT: Duration = Duration::from_secs(5);

/// The storefront router, pointed at `backend`.
#[must_use]
pub fn storefront(backend: &FakeBackend) -> Router {
    use app_shop_storefront::config::{ApiConfig, StorefrontConfig};

    let config = StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: Url::parse("https://shop.example/").unwrap(),
        api: ApiConfig {
            base_url: backend.base_url().clone(),
            timeout: API_TIMEOUT,
        },
        default_locale: Locale::Vi,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    app_shop_storefront::app(app_shop_storefront::state::AppState::new(config).unwrap())
}

/// The admin router, pointed at `backend`.
#[must_use]
pub fn admin(backend: &FakeBackend) -> Router {
    use app_shop_admin::config::{AdminConfig, ApiConfig};

    let config = AdminConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: Url::parse("https://admin.example/").unwrap(),
        api: ApiConfig {
            base_url: backend.base_url().clone(),
            timeout: API_TIMEOUT,
        },
        default_locale: Locale::Vi,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    app_shop_admin::app(app_shop_admin::state::AppState::new(config).unwrap())
}
