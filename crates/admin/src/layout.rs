//! Data every back-office page passes to `base.html`.

use app_shop_core::access::{Abilities, Ability};
use app_shop_core::notification::Notification;
use app_shop_core::permissions;
use app_shop_core::user::Locale;
use tower_sessions::Session;

use crate::middleware::{current_admin, take_flash};

/// Shared layout state: who is signed in, which nav entries they may see, and
/// the pending toast.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user_name: Option<String>,
    pub can_view_roles: bool,
    pub flash: Option<Notification>,
}

impl Layout {
    /// Build the layout for one render, taking the pending flash.
    pub async fn load(session: &Session, locale: Locale) -> Self {
        let admin = current_admin(session).await;
        let can_view_roles = admin.as_ref().is_some_and(|a| {
            Abilities::resolve(a.permissions(), &[permissions::role::VIEW])
                .can(&Ability::MANAGE_ALL)
        });
        Self {
            user_name: admin.map(|a| a.profile.display_name(locale)),
            can_view_roles,
            flash: take_flash(session).await,
        }
    }
}
