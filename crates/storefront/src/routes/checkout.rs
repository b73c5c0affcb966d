//! Checkout route handlers.
//!
//! The checkout page is reached with `productsSelected` and `totalPrice` in
//! the query string. Payment types, delivery types and cities are fetched
//! concurrently; each may fail on its own without taking the page down.
//! Changing the delivery method swaps in a fresh summary fragment via HTMX.

use app_shop_core::checkout::{CartSelection, CheckoutParams, CheckoutState, SelectedItem};
use app_shop_core::notification::{Notification, messages};
use app_shop_core::remote::Remote;
use app_shop_core::user::{Locale, UserProfile};
use app_shop_core::{DeliveryTypeId, PaymentTypeId};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
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
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One selected item as the checkout page shows it.
#[derive(Clone)]
pub struct CheckoutItemView {
    pub name: String,
    pub image: String,
    pub amount: u32,
    pub discount: u8,
    pub unit_price: String,
    /// Undiscounted unit price, only when a discount applies.
    pub original_price: Option<String>,
    pub line_price: String,
}

impl From<&SelectedItem> for CheckoutItemView {
    fn from(item: &SelectedItem) -> Self {
        Self {
            name: item.name.clone(),
            image: item.image.clone(),
            amount: item.amount,
            discount: item.discount,
            unit_price: item.unit_price().to_string(),
            original_price: item.has_discount().then(|| item.price.to_string()),
            line_price: item.line_price().to_string(),
        }
    }
}

/// A radio option (payment or delivery method).
#[derive(Clone)]
pub struct ChoiceView {
    pub id: String,
    pub name: String,
    /// Shown next to delivery methods.
    pub price: Option<String>,
    pub selected: bool,
}

/// Three-line money summary.
#[derive(Clone)]
pub struct SummaryView {
    pub item_subtotal: String,
    pub shipping: String,
    pub grand_total: String,
}

impl From<&CheckoutState> for SummaryView {
    fn from(state: &CheckoutState) -> Self {
        Self {
            item_subtotal: state.item_subtotal().to_string(),
            shipping: state.shipping_price().to_string(),
            grand_total: state.grand_total().to_string(),
        }
    }
}

/// The shopper's default delivery address, resolved for display.
#[derive(Clone)]
pub struct AddressView {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

impl AddressView {
    fn resolve(profile: &UserProfile, state: &CheckoutState, locale: Locale) -> Option<Self> {
        let address = profile.default_address()?;
        let city = address
            .city
            .as_ref()
            .and_then(|id| state.city_name(id))
            .unwrap_or_default()
            .to_string();
        Some(Self {
            full_name: address.full_name(locale),
            address: address.address.clone(),
            city,
            phone: address.phone_number.clone(),
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub items: Vec<CheckoutItemView>,
    pub payment_options: Vec<ChoiceView>,
    pub delivery_options: Vec<ChoiceView>,
    pub payment_error: Option<String>,
    pub delivery_error: Option<String>,
    pub address: Option<AddressView>,
    pub summary: SummaryView,
    /// Hidden field values carrying the selection into the POST.
    pub products_selected: String,
    pub total_price: String,
    /// Query string used by the summary fragment.
    pub summary_query: String,
    pub token: String,
}

impl CheckoutTemplate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the place-order button can be pressed.
    #[must_use]
    pub fn can_place_order(&self) -> bool {
        !self.items.is_empty()
            && self.payment_options.iter().any(|p| p.selected)
            && self.delivery_options.iter().any(|d| d.selected)
    }
}

/// Summary fragment template (HTMX partial).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_summary.html")]
pub struct CheckoutSummaryTemplate {
    pub summary: SummaryView,
}

// =============================================================================
// Form / Query Types
// =============================================================================

/// Query for the summary fragment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub products_selected: Option<String>,
    pub total_price: Option<String>,
    pub delivery_method: Option<String>,
}

/// Place-order form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderForm {
    pub products_selected: Option<String>,
    pub total_price: Option<String>,
    pub payment_method: Option<String>,
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub token: String,
}

impl PlaceOrderForm {
    fn params(&self) -> CheckoutParams {
        CheckoutParams {
            products_selected: self.products_selected.clone(),
            total_price: self.total_price.clone(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// URL of the checkout page for the given selection.
#[must_use]
pub fn checkout_url(params: &CheckoutParams) -> String {
    let mut url = String::from("/checkout");
    let mut separator = '?';
    for (key, value) in [
        ("productsSelected", &params.products_selected),
        ("totalPrice", &params.total_price),
    ] {
        if let Some(value) = value {
            url.push(separator);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = '&';
        }
    }
    url
}

/// Issue a fresh one-shot token for the next place-order submission.
async fn issue_token(session: &Session) -> Result<String> {
    let token = uuid::Uuid::new_v4().to_string();
    session
        .insert(session_keys::CHECKOUT_TOKEN, &token)
        .await?;
    Ok(token)
}

/// Take the pending token out of the session and compare.
///
/// The token is removed whether or not it matches, so a second submission of
/// the same form always fails.
async fn consume_token(session: &Session, submitted: &str) -> Result<bool> {
    let stored = session
        .remove::<String>(session_keys::CHECKOUT_TOKEN)
        .await?;
    Ok(stored.is_some_and(|stored| !submitted.is_empty() && stored == submitted))
}

fn choices<T>(
    remote: &Remote<Vec<T>>,
    selected: Option<&str>,
    view: impl Fn(&T) -> (String, String, Option<String>),
) -> Vec<ChoiceView> {
    remote
        .items()
        .iter()
        .map(|item| {
            let (id, name, price) = view(item);
            let selected = selected == Some(id.as_str());
            ChoiceView {
                id,
                name,
                price,
                selected,
            }
        })
        .collect()
}

/// Fetch all checkout reference data concurrently.
async fn load_reference_data(state: &AppState, checkout: &mut CheckoutState) {
    let api = state.api();
    let (payment_types, delivery_types, cities) =
        tokio::join!(api.payment_types(), api.delivery_types(), api.cities());

    for (what, failed) in [
        ("payment types", payment_types.as_ref().err()),
        ("delivery types", delivery_types.as_ref().err()),
        ("cities", cities.as_ref().err()),
    ] {
        if let Some(e) = failed {
            tracing::warn!("Failed to fetch {what} for checkout: {e}");
        }
    }

    checkout.payment_types_arrived(Remote::from_result(payment_types));
    checkout.delivery_types_arrived(Remote::from_result(delivery_types));
    checkout.cities_arrived(Remote::from_result(cities));
}

/// The shopper's profile as the backend has it now, so an address saved since
/// sign-in is the one used. Falls back to the signed-in copy on other errors.
async fn current_profile(state: &AppState, user: &CurrentUser) -> Result<UserProfile> {
    match state.api().me(user.token()).await {
        Ok(profile) => Ok(profile),
        Err(ApiError::Unauthorized) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!("Failed to refresh profile for checkout: {e}");
            Ok(user.profile.clone())
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, session, user, params))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAuth(user): RequireAuth,
    Query(params): Query<CheckoutParams>,
) -> Result<impl IntoResponse> {
    let (selection, malformed) = CartSelection::from_params_or_empty(&params);
    if let Some(e) = malformed {
        tracing::warn!("Ignoring malformed checkout parameters: {e}");
    }

    let mut checkout = CheckoutState::new(selection);
    let (profile, ()) = tokio::join!(
        current_profile(&state, &user),
        load_reference_data(&state, &mut checkout)
    );
    let profile = profile?;

    let token = issue_token(&session).await?;
    let hidden = checkout.selection.to_params();
    let summary_query = summary_query(&hidden);

    Ok(CheckoutTemplate {
        layout: Layout::load(&session, locale).await,
        items: checkout
            .selection
            .items
            .iter()
            .map(CheckoutItemView::from)
            .collect(),
        payment_options: choices(
            &checkout.payment_types,
            checkout.selected_payment.as_ref().map(PaymentTypeId::as_str),
            |p| (p.id.to_string(), p.name.clone(), None),
        ),
        delivery_options: choices(
            &checkout.delivery_types,
            checkout
                .selected_delivery
                .as_ref()
                .map(DeliveryTypeId::as_str),
            |d| (d.id.to_string(), d.name.clone(), Some(d.price.to_string())),
        ),
        payment_error: checkout
            .payment_types
            .failure()
            .map(|_| "Payment methods could not be loaded.".to_string()),
        delivery_error: checkout
            .delivery_types
            .failure()
            .map(|_| "Delivery methods could not be loaded.".to_string()),
        address: AddressView::resolve(&profile, &checkout, locale),
        summary: SummaryView::from(&checkout),
        products_selected: hidden.products_selected.unwrap_or_default(),
        total_price: hidden.total_price.unwrap_or_default(),
        summary_query,
        token,
    })
}

fn summary_query(params: &CheckoutParams) -> String {
    checkout_url(params)
        .strip_prefix("/checkout")
        .unwrap_or_default()
        .to_string()
}

/// Recompute the summary for a different delivery method (HTMX).
#[instrument(skip(state, query))]
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let params = CheckoutParams {
        products_selected: query.products_selected,
        total_price: query.total_price,
    };
    let (selection, _) = CartSelection::from_params_or_empty(&params);
    let mut checkout = CheckoutState::new(selection);

    if let Some(id) = query.delivery_method.filter(|id| !id.is_empty()) {
        checkout.select_delivery(DeliveryTypeId::new(id));
    }
    let delivery_types = state.api().delivery_types().await;
    if let Err(e) = &delivery_types {
        tracing::warn!("Failed to fetch delivery types for summary: {e}");
    }
    checkout.delivery_types_arrived(Remote::from_result(delivery_types));

    CheckoutSummaryTemplate {
        summary: SummaryView::from(&checkout),
    }
}

/// Place the order.
///
/// Totals are recomputed here from the submitted selection and the current
/// delivery prices; nothing price-related is taken from hidden fields except
/// the item subtotal fixed when the selection was made.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id()))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    if !consume_token(&session, &form.token).await? {
        tracing::info!("Rejected duplicate or stale order submission");
        set_flash(&session, Notification::error(messages::ORDER_DUPLICATE)).await;
        return Ok(Redirect::to("/my-order").into_response());
    }

    let params = form.params();
    let back = Redirect::to(&checkout_url(&params));

    let selection = match CartSelection::from_params(&params) {
        Ok(selection) => selection,
        Err(e) => {
            tracing::warn!("Rejected order with malformed selection: {e}");
            set_flash(&session, Notification::error(messages::ORDER_ERROR)).await;
            return Ok(back.into_response());
        }
    };

    let mut checkout = CheckoutState::new(selection);
    if let Some(id) = form.payment_method.filter(|id| !id.is_empty()) {
        checkout.select_payment(PaymentTypeId::new(id));
    }
    if let Some(id) = form.delivery_method.filter(|id| !id.is_empty()) {
        checkout.select_delivery(DeliveryTypeId::new(id));
    }
    let (profile, delivery_types) = tokio::join!(
        current_profile(&state, &user),
        state.api().delivery_types()
    );
    let profile = profile?;
    checkout.delivery_types_arrived(Remote::from_result(delivery_types));

    let draft = match checkout.build_order(&profile, locale) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!("Order not submitted: {e}");
            set_flash(&session, Notification::error(messages::ORDER_ERROR)).await;
            return Ok(back.into_response());
        }
    };

    match state.api().create_order(&user, &draft).await {
        Ok(created) => {
            tracing::info!(order_id = ?created.id, total = %draft.total_price, "Order placed");
            set_flash(&session, Notification::success(messages::ORDER_SUCCESS)).await;
            Ok(Redirect::to("/my-order").into_response())
        }
        Err(ApiError::Unauthorized) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::error!("Failed to create order: {e}");
            let message = e.user_message(messages::ORDER_ERROR).to_string();
            set_flash(&session, Notification::error(message)).await;
            Ok(back.into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use app_shop_core::Price;

    #[test]
    fn test_checkout_url_encodes_selection() {
        let params = CheckoutParams {
            products_selected: Some(r#"[{"product":"p1"}]"#.to_string()),
            total_price: Some("200000".to_string()),
        };
        assert_eq!(
            checkout_url(&params),
            "/checkout?productsSelected=%5B%7B%22product%22%3A%22p1%22%7D%5D&totalPrice=200000"
        );
    }

    #[test]
    fn test_checkout_url_without_params() {
        assert_eq!(checkout_url(&CheckoutParams::default()), "/checkout");
    }

    #[test]
    fn test_summary_query_is_bare_query_string() {
        let params = CheckoutParams {
            products_selected: None,
            total_price: Some("5".to_string()),
        };
        assert_eq!(summary_query(&params), "?totalPrice=5");
    }

    #[test]
    fn test_item_view_shows_original_price_only_when_discounted() {
        let item = SelectedItem {
            product: app_shop_core::ProductId::new("p1"),
            name: "Tea".to_string(),
            price: Price::from_dong(100_000),
            discount: 10,
            amount: 2,
            image: String::new(),
        };
        let view = CheckoutItemView::from(&item);
        assert_eq!(view.unit_price, "90.000 VND");
        assert_eq!(view.original_price.as_deref(), Some("100.000 VND"));
        assert_eq!(view.line_price, "180.000 VND");

        let plain = SelectedItem { discount: 0, ..item };
        assert!(CheckoutItemView::from(&plain).original_price.is_none());
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        use std::sync::Arc;
        use tower_sessions::MemoryStore;

        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let token = issue_token(&session).await.unwrap();

        assert!(consume_token(&session, &token).await.unwrap());
        assert!(!consume_token(&session, &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_mismatch_is_rejected() {
        use std::sync::Arc;
        use tower_sessions::MemoryStore;

        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        issue_token(&session).await.unwrap();

        assert!(!consume_token(&session, "forged").await.unwrap());
        assert!(!consume_token(&session, "").await.unwrap());
    }
}
