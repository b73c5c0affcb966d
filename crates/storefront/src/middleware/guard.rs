//! Page guard.
//!
//! Each route group is wrapped with its `PagePolicy`:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/checkout", get(checkout::show))
//!     .route_layer(from_fn_with_state(CHECKOUT_POLICY, page_guard))
//! ```
//!
//! The decision itself is made by [`app_shop_core::access::decide`]; this
//! module only turns it into a response.

use app_shop_core::access::{GuardDecision, PagePolicy, decide};
use app_shop_core::user::Locale;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Request, State},
    http::{StatusCode, header::ACCEPT_LANGUAGE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::filters;
use crate::layout::Layout;
use crate::middleware::auth::current_user;

/// 403 page.
#[derive(Template, WebTemplate)]
#[template(path = "errors/forbidden.html")]
pub struct ForbiddenTemplate {
    pub layout: Layout,
}

/// Sign-in URL that returns to `return_url` afterwards.
#[must_use]
pub fn login_url(return_url: &str) -> String {
    format!("/login?returnUrl={}", urlencoding::encode(return_url))
}

/// Path and query as the browser sent it, before any `nest` prefix was stripped.
fn requested_path(request: &Request) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri(), |original| &original.0);
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

/// Gate a request on the route's policy.
pub async fn page_guard(
    State(policy): State<PagePolicy>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let user = current_user(&session).await;
    let path = requested_path(&request);

    let decision = decide(&policy, user.as_ref().map(|u| u.permissions()), &path);

    match decision {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::RedirectToLogin { return_url } => {
            tracing::debug!(%return_url, "Guest on a signed-in page");
            Redirect::to(&login_url(&return_url)).into_response()
        }
        GuardDecision::RedirectHome => Redirect::to("/").into_response(),
        GuardDecision::NotAuthorized => {
            tracing::info!(
                path = %path,
                user_id = ?user.as_ref().map(|u| u.id().clone()),
                "Permission check failed"
            );
            let locale = request
                .headers()
                .get(ACCEPT_LANGUAGE)
                .and_then(|h| h.to_str().ok())
                .and_then(Locale::from_accept_language)
                .unwrap_or_default();
            let layout = Layout::load(&session, locale).await;
            (StatusCode::FORBIDDEN, ForbiddenTemplate { layout }).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_return_path() {
        assert_eq!(
            login_url("/checkout?totalPrice=1&x=2"),
            "/login?returnUrl=%2Fcheckout%3FtotalPrice%3D1%26x%3D2"
        );
    }
}
