//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Timeout (bound every request, including backend calls)
//! 5. Session layer (tower-sessions with in-memory store)
//! 6. Session expiry (drop the stored user after a backend 401)
//! 7. Page guard (per route group, from its `PagePolicy`)

pub mod auth;
pub mod flash;
pub mod guard;
pub mod locale;
pub mod request_id;
pub mod session;

pub use auth::{
    RequireAuth, SessionExpired, clear_current_user, session_expiry_middleware, set_current_user,
};
pub use flash::{set_flash, take_flash};
pub use guard::page_guard;
pub use locale::ViewerLocale;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
