//! Order history route handlers.

use app_shop_core::OrderId;
use app_shop_core::notification::{Notification, messages};
use app_shop_core::order::{Order, OrderLine};
use app_shop_core::pagination::{DEFAULT_PAGE_SIZE, ListParams};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, ViewerLocale, set_flash};
use crate::state::AppState;

/// One order line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub image: String,
    pub amount: u32,
    pub discount: u8,
    pub line_price: String,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: line.name.clone(),
            image: line.image.clone(),
            amount: line.amount,
            discount: line.discount,
            line_price: line.line_price().to_string(),
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: &'static str,
    pub placed_on: String,
    pub can_cancel: bool,
    pub lines: Vec<OrderLineView>,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub items_price: String,
    pub shipping_price: String,
    pub total_price: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.label(),
            placed_on: order
                .created_at
                .map(|at| at.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            can_cancel: order.can_cancel(),
            lines: order.order_items.iter().map(OrderLineView::from).collect(),
            full_name: order.shipping_address.full_name.clone(),
            address: order.shipping_address.address.clone(),
            phone: order.shipping_address.phone.clone(),
            items_price: order.items_price.to_string(),
            shipping_price: order.shipping_price.to_string(),
            total_price: order.total_price.to_string(),
        }
    }
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderView>,
    pub page: i64,
    pub total_pages: i64,
    pub load_error: Option<String>,
}

impl OrdersIndexTemplate {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// Query parameters for the order list.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<i64>,
}

/// Display the signed-in user's orders.
#[instrument(skip(state, session, user), fields(user_id = %user.id()))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse> {
    let params = ListParams::page(query.page.unwrap_or(1), DEFAULT_PAGE_SIZE);

    let (orders, total_pages, load_error) = match state.api().my_orders(&user, params).await {
        Ok(page) => (
            page.orders.iter().map(OrderView::from).collect(),
            i64::try_from(page.total_page).unwrap_or(i64::MAX),
            None,
        ),
        Err(ApiError::Unauthorized) => return Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            (
                Vec::new(),
                0,
                Some("Your orders could not be loaded.".to_string()),
            )
        }
    };

    Ok(OrdersIndexTemplate {
        layout: Layout::load(&session, locale).await,
        orders,
        page: params.page,
        total_pages,
        load_error,
    })
}

/// Display one order.
#[instrument(skip(state, session, user), fields(user_id = %user.id()))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order = state.api().my_order(&user, &OrderId::new(id)).await?;

    Ok(OrderShowTemplate {
        layout: Layout::load(&session, locale).await,
        order: OrderView::from(&order),
    })
}

/// Cancel one order and return to the list.
#[instrument(skip(state, session, user), fields(user_id = %user.id()))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = OrderId::new(id);

    match state.api().cancel_order(&user, &id).await {
        Ok(()) => {
            tracing::info!(order_id = %id, "Order cancelled");
            set_flash(&session, Notification::success(messages::CANCEL_ORDER_SUCCESS)).await;
        }
        Err(ApiError::Unauthorized) => return Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!(order_id = %id, "Failed to cancel order: {e}");
            let message = e.user_message(messages::CANCEL_ORDER_ERROR).to_string();
            set_flash(&session, Notification::error(message)).await;
        }
    }

    Ok(Redirect::to("/my-order").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_order_view_formats_money_and_date() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "orderItems": [
                {"name": "Tea", "price": 100000, "discount": 10, "amount": 2}
            ],
            "shippingAddress": {"fullName": "Nguyen Van A", "address": "1 Le Loi", "phone": "090"},
            "itemsPrice": 180000,
            "shippingPrice": 50000,
            "totalPrice": 230000,
            "status": 1,
            "createdAt": "2024-03-05T10:00:00Z"
        }))
        .unwrap();

        let view = OrderView::from(&order);
        assert_eq!(view.status, "Waiting for delivery");
        assert_eq!(view.placed_on, "05/03/2024");
        assert!(view.can_cancel);
        assert_eq!(view.lines[0].line_price, "180.000 VND");
        assert_eq!(view.total_price, "230.000 VND");
    }
}
