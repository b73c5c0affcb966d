//! One-shot notifications stored in the session.

use app_shop_core::notification::Notification;
use tower_sessions::Session;

use crate::models::session_keys;

/// Store the notification to show on the next rendered page.
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_flash(&session, Notification::error("Role name taken")).await;

        assert_eq!(
            take_flash(&session).await,
            Some(Notification::error("Role name taken"))
        );
        assert_eq!(take_flash(&session).await, None);
    }
}
