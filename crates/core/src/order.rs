//! Placed orders, as the backend reports them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, Price};

/// One line of a placed order.
///
/// The backend sometimes expands `product` into a full document, so it is not
/// read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub discount: u8,
    pub amount: u32,
    #[serde(default)]
    pub image: String,
}

impl OrderLine {
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.discounted(self.discount) * self.amount
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub phone: String,
}

/// A previously placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub items_price: Price,
    #[serde(default)]
    pub shipping_price: Price,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.status.is_cancellable()
    }
}

/// The `data` of `GET /orders/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total_page: u64,
    #[serde(default)]
    pub total_count: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_expanded_product() {
        let json = serde_json::json!({
            "_id": "o1",
            "orderItems": [{
                "product": { "_id": "p1", "name": "Lotus tea" },
                "name": "Lotus tea",
                "price": 100000,
                "discount": 10,
                "amount": 2
            }],
            "shippingAddress": { "fullName": "Nguyen Van An", "address": "2 Tran Phu", "phone": "0900" },
            "itemsPrice": 200000,
            "shippingPrice": 30000,
            "totalPrice": 230000,
            "status": 1,
            "createdAt": "2024-05-01T12:00:00.000Z"
        });
        let order: Order = serde_json::from_value(json).unwrap();

        assert_eq!(order.status, OrderStatus::WaitDelivery);
        assert!(order.can_cancel());
        assert_eq!(order.order_items[0].line_price(), Price::from_dong(180_000));
        assert_eq!(order.total_price, Price::from_dong(230_000));
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_done_order_cannot_be_cancelled() {
        let json = serde_json::json!({ "_id": "o2", "status": 2 });
        let order: Order = serde_json::from_value(json).unwrap();
        assert!(!order.can_cancel());
    }
}
