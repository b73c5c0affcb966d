//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers that cannot degrade gracefully
//! return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::middleware::SessionExpired;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(err, ApiError::Unauthorized | ApiError::NotFound(_)),
            Self::Session(_) => true,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // An expired backend token ends the session; the marker tells the
        // session middleware to drop the stored user.
        if matches!(self, Self::Api(ApiError::Unauthorized)) {
            let mut response = Redirect::to("/login").into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        // Don't expose internal error details to clients
        let (status, message) = match &self {
            Self::Api(ApiError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found"),
            Self::Api(_) => (StatusCode::BAD_GATEWAY, "External service error"),
            Self::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Api(ApiError::NotFound("product lotus-tea".to_string()));
        assert_eq!(err.to_string(), "Backend error: Not found: product lotus-tea");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Api {
                status: 500,
                message: "boom".to_string(),
                type_error: None,
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_unauthorized_redirects_and_marks_session_expired() {
        let response = AppError::Api(ApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
