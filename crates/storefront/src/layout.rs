//! Data every page passes to `base.html`.

use app_shop_core::notification::Notification;
use app_shop_core::user::Locale;
use tower_sessions::Session;

use crate::middleware::auth::current_user;
use crate::middleware::take_flash;

/// Shared layout state: the signed-in user's name and the pending toast.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user_name: Option<String>,
    pub flash: Option<Notification>,
}

impl Layout {
    /// Build the layout for one render.
    ///
    /// Takes the pending flash out of the session, so it is shown exactly once.
    pub async fn load(session: &Session, locale: Locale) -> Self {
        let user_name = current_user(session)
            .await
            .map(|user| user.profile.display_name(locale));
        let flash = take_flash(session).await;
        Self { user_name, flash }
    }
}
