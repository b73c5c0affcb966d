//! Back-office sign-in.

use app_shop_core::user::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError};

/// `data` of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    #[serde(alias = "accessToken")]
    pub access_token: String,
}

impl ApiClient {
    /// Exchange credentials for a profile and access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Api` for bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.send(reqwest::Method::POST, "auth/login", &[], None, Some(&body))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_reads_snake_case_token() {
        let response: LoginResponse = serde_json::from_value(serde_json::json!({
            "user": { "_id": "u1", "email": "staff@example.com" },
            "access_token": "abc",
        }))
        .unwrap();
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.user.email, "staff@example.com");
    }

    #[test]
    fn test_login_response_accepts_camel_case_token() {
        let response: LoginResponse = serde_json::from_value(serde_json::json!({
            "user": { "_id": "u1", "email": "staff@example.com" },
            "accessToken": "abc",
        }))
        .unwrap();
        assert_eq!(response.access_token, "abc");
    }
}
