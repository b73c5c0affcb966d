//! One-shot user notifications (toasts).
//!
//! A handler that finishes a mutation stores exactly one [`Notification`] in
//! the session; the next rendered page takes it out again, so every outcome
//! is shown once no matter how often the page re-renders afterwards.

use serde::{Deserialize, Serialize};

/// Toast flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message to show once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NotificationKind::Error)
    }

    /// CSS modifier used by the toast partial.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            NotificationKind::Success => "toast-success",
            NotificationKind::Error => "toast-error",
        }
    }
}

/// Message texts shared by both binaries.
pub mod messages {
    pub const ORDER_SUCCESS: &str = "Your order has been placed.";
    pub const ORDER_ERROR: &str = "We could not place your order. Please try again.";
    pub const ORDER_DUPLICATE: &str = "This order was already submitted.";
    pub const CANCEL_ORDER_SUCCESS: &str = "Your order has been cancelled.";
    pub const CANCEL_ORDER_ERROR: &str = "We could not cancel this order.";
    pub const CREATE_ROLE_SUCCESS: &str = "Role created.";
    pub const CREATE_ROLE_ERROR: &str = "Could not create the role.";
    pub const UPDATE_ROLE_SUCCESS: &str = "Role updated.";
    pub const UPDATE_ROLE_ERROR: &str = "Could not update the role.";
    pub const LOGIN_SUCCESS: &str = "Signed in.";
    pub const LOGIN_ERROR: &str = "Incorrect email or password.";
    pub const LOGOUT_SUCCESS: &str = "Signed out.";
    pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
}
