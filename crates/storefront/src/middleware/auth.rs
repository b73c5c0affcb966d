//! Authentication extractors and session-expiry handling.
//!
//! Provides extractors for requiring a signed-in user in route handlers.

use app_shop_core::notification::{Notification, messages};
use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::clear_sentry_user;
use crate::middleware::flash::set_flash;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// Pages behind an `Authenticated` guard never reach the rejection path; it
/// exists for handlers used outside a guard.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.profile.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// No session layer in front of this route.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let user = current_user(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Read the signed-in user from the session.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Helper to set the current user in the session.
///
/// Cycles the session id to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.remove::<String>(session_keys::CHECKOUT_TOKEN).await?;
    Ok(())
}

/// Response marker: the backend rejected the user's access token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Drop the stored user when a handler reports an expired backend session.
pub async fn session_expiry_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("Backend rejected access token, signing out");
        if let Err(e) = clear_current_user(&session).await {
            tracing::error!("Failed to clear expired session: {e}");
        }
        clear_sentry_user();
        set_flash(&session, Notification::error(messages::SESSION_EXPIRED)).await;
    }

    response
}
