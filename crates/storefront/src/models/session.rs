//! Session-related types.
//!
//! Types stored in the session for authentication state.

use app_shop_core::UserId;
use app_shop_core::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// Holds the profile returned at sign-in and the backend access token.
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub profile: UserProfile,
    pub access_token: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.profile.id
    }

    #[must_use]
    pub fn permissions(&self) -> &[String] {
        self.profile.permissions()
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.profile.id)
            .field("email", &self.profile.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the one-shot notification shown on the next render.
    pub const FLASH: &str = "flash";

    /// Key for the checkout submission token issued with the last render.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "email": "an@example.com"
        }))
        .unwrap();
        let user = CurrentUser {
            profile,
            access_token: "eyJhbGciOi.secret".to_string(),
        };
        let debug_output = format!("{user:?}");
        assert!(debug_output.contains("an@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("eyJhbGciOi"));
    }
}
