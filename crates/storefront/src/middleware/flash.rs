//! One-shot notifications stored in the session.

use app_shop_core::notification::Notification;
use tower_sessions::Session;

use crate::models::session_keys;

/// Store the notification to show on the next rendered page.
///
/// A later call replaces an earlier one that was never shown.
pub async fn set_flash(session: &Session, notification: Notification) {
    if let Err(e) = session.insert(session_keys::FLASH, notification).await {
        tracing::error!("Failed to store flash notification: {e}");
    }
}

/// Take the pending notification out of the session, if any.
pub async fn take_flash(session: &Session) -> Option<Notification> {
    session
        .remove::<Notification>(session_keys::FLASH)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to read flash notification: {e}");
            None
        })
}
