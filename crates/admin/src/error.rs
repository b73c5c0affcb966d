//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::middleware::SessionExpired;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        let is_server_error = match &self {
            Self::Api(err) => !matches!(err, ApiError::Unauthorized | ApiError::NotFound(_)),
            Self::Session(_) => true,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        if matches!(self, Self::Api(ApiError::Unauthorized)) {
            let mut response = Redirect::to("/login").into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        let (status, message) = match &self {
            Self::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
            Self::Api(ApiError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found"),
            Self::Api(_) => (StatusCode::BAD_GATEWAY, "Backend unavailable"),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in staff member.
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

    #[test]
    fn test_app_error_display() {
        let err = AppError::Api(ApiError::NotFound("role r1".to_string()));
        assert_eq!(err.to_string(), "Backend error: Not found: role r1");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("roles/x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Api {
                status: 503,
                message: "down".to_string(),
                type_error: None,
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Unauthorized)),
            StatusCode::SEE_OTHER
        );
    }
}
