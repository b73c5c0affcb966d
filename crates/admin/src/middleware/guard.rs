//! Page guard for back-office routes.
//!
//! Same decision as the storefront: [`app_shop_core::access::decide`] picks
//! the outcome, this module renders it. Fragment requests issued by HTMX get
//! an `HX-Redirect` header instead of a 303 so the whole page navigates.

use app_shop_core::access::{GuardDecision, PagePolicy, decide};
use app_shop_core::user::Locale;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::ACCEPT_LANGUAGE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::Span;

use crate::filters;
use crate::layout::Layout;
use crate::middleware::auth::current_admin;

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

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some_and(|v| v == "true")
}

/// Redirect that works for both full page loads and HTMX swaps.
#[must_use]
pub fn navigate(headers: &HeaderMap, to: &str) -> Response {
    if is_htmx(headers) {
        match HeaderValue::from_str(to) {
            Ok(value) => ([("hx-redirect", value)], StatusCode::OK).into_response(),
            Err(_) => Redirect::to("/").into_response(),
        }
    } else {
        Redirect::to(to).into_response()
    }
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
    let admin = current_admin(&session).await;
    if let Some(admin) = &admin {
        Span::current().record("admin_id", admin.id().as_str());
    }
    let path = requested_path(&request);

    match decide(&policy, admin.as_ref().map(|a| a.permissions()), &path) {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::RedirectToLogin { return_url } => {
            navigate(request.headers(), &login_url(&return_url))
        }
        GuardDecision::RedirectHome => navigate(request.headers(), "/dashboard"),
        GuardDecision::NotAuthorized => {
            tracing::info!(
                path = %path,
                admin_id = ?admin.as_ref().map(|a| a.id().clone()),
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
    fn test_htmx_requests_get_hx_redirect() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));

        let response = navigate(&headers, "/login?returnUrl=%2Fsystem%2Frole");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("hx-redirect").and_then(|v| v.to_str().ok()),
            Some("/login?returnUrl=%2Fsystem%2Frole")
        );
    }

    #[test]
    fn test_plain_requests_get_see_other() {
        let response = navigate(&HeaderMap::new(), "/dashboard");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
