//! Authentication route handlers.
//!
//! Signs shoppers in against the backend's `/auth/login` and keeps the
//! returned profile and access token in the session.

use app_shop_core::access::safe_return_url;
use app_shop_core::notification::{Notification, messages};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ViewerLocale, clear_current_user, set_current_user, set_flash};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form / Query Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
    #[serde(default, rename = "returnUrl")]
    pub return_url: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub email: String,
    /// Only ever a same-origin path.
    pub return_url: String,
}

fn sanitize_return_url(candidate: Option<&str>) -> String {
    candidate
        .and_then(safe_return_url)
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::load(&session, locale).await,
        error: None,
        email: String::new(),
        return_url: sanitize_return_url(query.return_url.as_deref()),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    Form(form): Form<LoginForm>,
) -> Response {
    let return_url = sanitize_return_url(Some(&form.return_url));

    let error = match state.api().login(form.email.trim(), &form.password).await {
        Ok(login) => {
            let user = CurrentUser {
                profile: login.user,
                access_token: login.access_token,
            };

            match set_current_user(&session, &user).await {
                Ok(()) => {
                    set_sentry_user(user.id(), Some(&user.profile.email));
                    tracing::info!(user_id = %user.id(), "User signed in");
                    set_flash(&session, Notification::success(messages::LOGIN_SUCCESS)).await;
                    let target = if return_url.is_empty() { "/" } else { &return_url };
                    return Redirect::to(target).into_response();
                }
                Err(e) => {
                    tracing::error!("Failed to store session: {e}");
                    messages::LOGIN_ERROR.to_string()
                }
            }
        }
        Err(ApiError::Unauthorized) => messages::LOGIN_ERROR.to_string(),
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            e.user_message(messages::LOGIN_ERROR).to_string()
        }
    };

    LoginTemplate {
        layout: Layout::load(&session, locale).await,
        error: Some(error),
        email: form.email,
        return_url,
    }
    .into_response()
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    set_flash(&session, Notification::success(messages::LOGOUT_SUCCESS)).await;
    Redirect::to("/").into_response()
}
