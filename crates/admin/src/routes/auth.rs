//! Authentication route handlers for admin.
//!
//! Staff sign in with the same backend endpoint as shoppers; what they may
//! open afterwards is decided by the permissions on their role.

use app_shop_core::access::safe_return_url;
use app_shop_core::notification::{Notification, messages};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ViewerLocale, clear_current_admin, set_current_admin, set_flash};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Where a sign-in without a return URL lands.
const HOME_PATH: &str = "/dashboard";

/// `GET/POST /login`; wrapped in the guest-only guard by the caller.
pub fn login_router() -> Router<AppState> {
    Router::new().route("/login", get(login_page).post(login))
}

/// `POST /logout`, reachable with or without a session.
pub fn logout_router() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
    #[serde(default, rename = "returnUrl")]
    pub return_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub email: String,
    pub return_url: String,
}

/// Render the login page.
///
/// GET /login
#[instrument(skip(session))]
async fn login_page(
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::load(&session, locale).await,
        error: None,
        email: String::new(),
        return_url: query
            .return_url
            .as_deref()
            .and_then(safe_return_url)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Sign in and store the staff member in the session.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    Form(form): Form<LoginForm>,
) -> Response {
    let return_url = safe_return_url(&form.return_url)
        .unwrap_or_default()
        .to_string();

    let error = match state.api().login(form.email.trim(), &form.password).await {
        Ok(login) => {
            let admin = CurrentAdmin {
                profile: login.user,
                access_token: login.access_token,
            };
            match set_current_admin(&session, &admin).await {
                Ok(()) => {
                    set_sentry_user(admin.id(), Some(&admin.profile.email));
                    tracing::info!(admin_id = %admin.id(), "Admin signed in");
                    set_flash(&session, Notification::success(messages::LOGIN_SUCCESS)).await;
                    let target = if return_url.is_empty() {
                        HOME_PATH
                    } else {
                        &return_url
                    };
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
            tracing::warn!("Admin login failed: {e}");
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

/// Logout and clear session.
///
/// POST /logout
async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    set_flash(&session, Notification::success(messages::LOGOUT_SUCCESS)).await;
    Redirect::to("/login").into_response()
}
