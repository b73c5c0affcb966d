//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the backend.
///
/// The backend encodes statuses as small integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderStatus {
    /// Placed, waiting for payment.
    #[default]
    WaitPayment,
    /// Paid (or cash on delivery), waiting for delivery.
    WaitDelivery,
    /// Delivered.
    Done,
    /// Cancelled by the customer or an operator.
    Cancelled,
}

impl OrderStatus {
    /// Whether the owner may still cancel an order in this status.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::WaitPayment | Self::WaitDelivery)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaitPayment => "Waiting for payment",
            Self::WaitDelivery => "Waiting for delivery",
            Self::Done => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<u8> for OrderStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::WaitPayment),
            1 => Ok(Self::WaitDelivery),
            2 => Ok(Self::Done),
            3 => Ok(Self::Cancelled),
            other => Err(format!("invalid order status: {other}")),
        }
    }
}

impl From<OrderStatus> for u8 {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::WaitPayment => 0,
            OrderStatus::WaitDelivery => 1,
            OrderStatus::Done => 2,
            OrderStatus::Cancelled => 3,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_from_backend_code() {
        let status: OrderStatus = serde_json::from_str("1").unwrap();
        assert_eq!(status, OrderStatus::WaitDelivery);
        assert!(serde_json::from_str::<OrderStatus>("9").is_err());
    }

    #[test]
    fn test_only_open_orders_are_cancellable() {
        assert!(OrderStatus::WaitPayment.is_cancellable());
        assert!(OrderStatus::WaitDelivery.is_cancellable());
        assert!(!OrderStatus::Done.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }
}
