//! Cache types for backend responses.

use app_shop_core::checkout::{City, DeliveryType, PaymentType};
use app_shop_core::order::{Order, OrderPage};
use app_shop_core::pagination::ListParams;
use app_shop_core::product::Product;
use app_shop_core::{OrderId, UserId};

/// Cache key: one variant per read endpoint, carrying every parameter the
/// response depends on.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(String),
    PaymentTypes,
    DeliveryTypes,
    Cities,
    MyOrders { user: UserId, params: ListParams },
    MyOrder { user: UserId, id: OrderId },
}

impl CacheKey {
    /// Whether this entry belongs to `user`'s order history.
    #[must_use]
    pub fn is_orders_of(&self, user: &UserId) -> bool {
        match self {
            Self::MyOrders { user: owner, .. } | Self::MyOrder { user: owner, .. } => owner == user,
            _ => false,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    PaymentTypes(Vec<PaymentType>),
    DeliveryTypes(Vec<DeliveryType>),
    Cities(Vec<City>),
    MyOrders(OrderPage),
    MyOrder(Box<Order>),
}
