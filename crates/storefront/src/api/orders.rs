//! Order placement and history.
//!
//! History reads are cached per user. Placing or cancelling an order drops
//! every cached history entry of that user.

use app_shop_core::OrderId;
use app_shop_core::checkout::OrderDraft;
use app_shop_core::order::{Order, OrderPage};
use app_shop_core::pagination::ListParams;
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, CacheValue};
use crate::models::CurrentUser;

/// What the backend reports back for a placed order.
///
/// Only the id is read; the history page refetches everything else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedOrder {
    #[serde(rename = "_id", default)]
    pub id: Option<OrderId>,
}

impl ApiClient {
    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip(self, user, draft), fields(user_id = %user.id(), items = draft.order_items.len()))]
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        draft: &OrderDraft,
    ) -> Result<CreatedOrder, ApiError> {
        let body = serde_json::to_value(draft)?;
        let created: Option<CreatedOrder> =
            self.post("orders", Some(user.token()), Some(&body)).await?;
        self.forget_orders_of(user);
        Ok(created.unwrap_or_default())
    }

    /// One page of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    pub async fn my_orders(
        &self,
        user: &CurrentUser,
        params: ListParams,
    ) -> Result<OrderPage, ApiError> {
        let key = CacheKey::MyOrders {
            user: user.id().clone(),
            params,
        };
        if let Some(CacheValue::MyOrders(page)) = self.cached(&key).await {
            return Ok(page);
        }

        let page: OrderPage = self
            .get("orders/me", &params.query_pairs(), Some(user.token()))
            .await?;

        self.remember(key, CacheValue::MyOrders(page.clone())).await;
        Ok(page)
    }

    /// One of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or is not the
    /// user's.
    #[instrument(skip(self, user), fields(user_id = %user.id(), order_id = %id))]
    pub async fn my_order(&self, user: &CurrentUser, id: &OrderId) -> Result<Order, ApiError> {
        let key = CacheKey::MyOrder {
            user: user.id().clone(),
            id: id.clone(),
        };
        if let Some(CacheValue::MyOrder(order)) = self.cached(&key).await {
            return Ok(*order);
        }

        let path = format!("orders/me/{}", urlencoding::encode(id.as_str()));
        let order: Option<Order> = self.get(&path, &[], Some(user.token())).await?;
        let order = order.ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;

        self.remember(key, CacheValue::MyOrder(Box::new(order.clone())))
            .await;
        Ok(order)
    }

    /// Cancel one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses (e.g. already delivered).
    #[instrument(skip(self, user), fields(user_id = %user.id(), order_id = %id))]
    pub async fn cancel_order(&self, user: &CurrentUser, id: &OrderId) -> Result<(), ApiError> {
        let path = format!("orders/me/cancel/{}", urlencoding::encode(id.as_str()));
        let _: serde::de::IgnoredAny = self.post(&path, Some(user.token()), None).await?;
        self.forget_orders_of(user);
        Ok(())
    }

    fn forget_orders_of(&self, user: &CurrentUser) {
        let owner = user.id().clone();
        self.forget_where(move |key| key.is_orders_of(&owner));
    }
}
