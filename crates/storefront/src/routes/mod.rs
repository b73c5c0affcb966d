//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (product grid)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (backend reachable)
//! GET  /sitemap.xml            - Sitemap
//! GET  /robots.txt             - Crawler rules
//!
//! # Products (public)
//! GET  /product/{slug}         - Product detail
//! POST /product/{slug}/buy     - Buy now (redirects to checkout)
//!
//! # Checkout (signed in)
//! GET  /checkout               - Checkout page
//! GET  /checkout/summary       - Totals fragment (HTMX)
//! POST /checkout               - Place order
//!
//! # Orders (signed in)
//! GET  /my-order               - Order history
//! GET  /my-order/{id}          - Order detail
//! POST /my-order/{id}/cancel   - Cancel order
//!
//! # Auth
//! GET  /login                  - Login page (guests only)
//! POST /login                  - Login action (guests only)
//! POST /logout                 - Logout action
//! ```

pub mod auth;
pub mod checkout;
pub mod health;
pub mod home;
pub mod orders;
pub mod products;
pub mod seo;

use app_shop_core::access::PagePolicy;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::page_guard;
use crate::state::AppState;

/// Home and product pages.
pub const CATALOG_POLICY: PagePolicy = PagePolicy::public();

/// Checkout requires a signed-in user with no extra permissions.
pub const CHECKOUT_POLICY: PagePolicy = PagePolicy::authenticated();

/// Order history.
pub const ORDERS_POLICY: PagePolicy = PagePolicy::authenticated();

/// Login is for guests; signed-in users are sent home.
pub const LOGIN_POLICY: PagePolicy = PagePolicy::guest_only();

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/product/{slug}", get(products::show))
        .route("/product/{slug}/buy", post(products::buy_now))
        .route_layer(from_fn_with_state(CATALOG_POLICY, page_guard))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/summary", get(checkout::summary))
        .route_layer(from_fn_with_state(CHECKOUT_POLICY, page_guard))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route_layer(from_fn_with_state(ORDERS_POLICY, page_guard))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route_layer(from_fn_with_state(LOGIN_POLICY, page_guard))
        .route("/logout", post(auth::logout))
}

/// Routes with no guard: crawlers and probes.
pub fn unguarded_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        .route("/robots.txt", get(seo::robots_txt))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/checkout", checkout_routes())
        .nest("/my-order", order_routes())
        .merge(auth_routes())
        .merge(unguarded_routes())
}
