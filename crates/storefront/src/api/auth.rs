//! Sign-in endpoints.

use app_shop_core::user::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError};

/// `data` of a successful `POST /auth/login`.
#[derive(Clone, Deserialize)]
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
        self.post("auth/login", None, Some(&body)).await
    }

    /// The profile behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.get("auth/me", &[], Some(token)).await
    }
}
