//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (backend reachable)
//! GET  /                           - Redirect to the dashboard
//!
//! # Dashboard (DASHBOARD)
//! GET  /dashboard                  - Overview
//!
//! # Roles
//! GET  /system/role                - Role list (SYSTEM.ROLE.VIEW)
//! GET  /system/role/new            - Create modal fragment (SYSTEM.ROLE.CREATE)
//! POST /system/role                - Create role (SYSTEM.ROLE.CREATE)
//! GET  /system/role/{id}/edit      - Edit modal fragment (SYSTEM.ROLE.UPDATE)
//! POST /system/role/{id}           - Rename role (SYSTEM.ROLE.UPDATE)
//! POST /system/role/validate       - Name field fragment, on blur
//! GET  /system/role/close          - Empty modal fragment
//!
//! # Auth
//! GET  /login                      - Login page (guests only)
//! POST /login                      - Login action (guests only)
//! POST /logout                     - Logout
//! ```

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod roles;

use app_shop_core::access::PagePolicy;
use app_shop_core::permissions::{self, role};
use axum::{
    Router,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::get,
};

use crate::middleware::page_guard;
use crate::state::AppState;

/// Dashboard: any staff role carries `DASHBOARD`.
pub const DASHBOARD_POLICY: PagePolicy =
    PagePolicy::authenticated().with_permissions(&[permissions::DASHBOARD]);

pub const ROLE_VIEW_POLICY: PagePolicy =
    PagePolicy::authenticated().with_permissions(&[role::VIEW]);

pub const ROLE_CREATE_POLICY: PagePolicy =
    PagePolicy::authenticated().with_permissions(&[role::CREATE]);

pub const ROLE_UPDATE_POLICY: PagePolicy =
    PagePolicy::authenticated().with_permissions(&[role::UPDATE]);

/// The modal's helpers serve both create and edit.
pub const ROLE_FORM_POLICY: PagePolicy =
    PagePolicy::authenticated().with_permissions(&[role::CREATE, role::UPDATE]);

/// Login is for guests; signed-in staff are sent to the dashboard.
pub const LOGIN_POLICY: PagePolicy = PagePolicy::guest_only();

/// Wrap a router in the guard for `policy`.
fn guarded(router: Router<AppState>, policy: PagePolicy) -> Router<AppState> {
    router.route_layer(from_fn_with_state(policy, page_guard))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .merge(guarded(dashboard::router(), DASHBOARD_POLICY))
        .nest("/system/role", roles::router())
        .merge(guarded(auth::login_router(), LOGIN_POLICY))
        .merge(auth::logout_router())
        .merge(health::router())
}
