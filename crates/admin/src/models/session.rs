//! Session-related types for admin authentication.

use app_shop_core::UserId;
use app_shop_core::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Session-stored staff identity: the profile from sign-in plus the backend
/// access token. `Debug` redacts the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub profile: UserProfile,
    pub access_token: String,
}

impl CurrentAdmin {
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

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.profile.id)
            .field("email", &self.profile.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in staff member.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the pending one-shot notification.
    pub const FLASH: &str = "flash";
}
