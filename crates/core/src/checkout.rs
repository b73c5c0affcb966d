//! Checkout: cart selection, reference data, totals and the order payload.
//!
//! The cart selection arrives as two navigation parameters, a JSON array of
//! items and a numeric total. Both are untrusted. Reference data (payment
//! types, delivery types, cities) is fetched independently and tracked per
//! resource with [`Remote`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::Remote;
use crate::types::{CityId, DeliveryTypeId, PaymentTypeId, Price, ProductId, UserId};
use crate::user::{Locale, UserProfile};

/// Errors from reading the navigation parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("productsSelected is not a valid item list: {0}")]
    MalformedItems(String),
    #[error("totalPrice is not a non-negative number: {0:?}")]
    MalformedTotal(String),
}

/// Reasons an order cannot be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("no items selected")]
    EmptySelection,
    #[error("no payment method selected")]
    MissingPaymentMethod,
    #[error("no delivery method selected")]
    MissingDeliveryMethod,
    #[error("unknown delivery method: {0}")]
    UnknownDeliveryMethod(DeliveryTypeId),
    #[error("delivery prices are not available")]
    DeliveryPricesUnavailable,
}

/// One line of the cart selection.
///
/// Also the wire shape of an order item, so it serializes with `product`
/// even when the selection used the older `id` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    #[serde(alias = "id")]
    pub product: ProductId,
    #[serde(default)]
    pub name: String,
    /// Unit price before discount.
    pub price: Price,
    /// Percent off, `0..=100`.
    #[serde(default)]
    pub discount: u8,
    /// Quantity.
    pub amount: u32,
    #[serde(default)]
    pub image: String,
}

impl SelectedItem {
    /// Unit price after discount.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.discounted(self.discount)
    }

    /// Discounted unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.unit_price() * self.amount
    }

    #[must_use]
    pub const fn has_discount(&self) -> bool {
        self.discount > 0
    }
}

/// Raw checkout navigation parameters, as they appear in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutParams {
    pub products_selected: Option<String>,
    pub total_price: Option<String>,
}

/// The items being bought and their already-fixed subtotal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSelection {
    pub items: Vec<SelectedItem>,
    pub item_subtotal: Price,
}

impl CartSelection {
    /// Parse the navigation parameters.
    ///
    /// Absent parameters mean "nothing": no items, zero subtotal. Present but
    /// malformed parameters are an error; callers that want the forgiving
    /// behaviour use [`CartSelection::from_params_or_empty`].
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if either parameter is present but malformed.
    pub fn from_params(params: &CheckoutParams) -> Result<Self, SelectionError> {
        let items = match params.products_selected.as_deref() {
            None => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<SelectedItem>>(raw)
                .map_err(|e| SelectionError::MalformedItems(e.to_string()))?,
        };
        let item_subtotal = match params.total_price.as_deref() {
            None => Price::ZERO,
            Some(raw) => {
                Price::parse(raw).ok_or_else(|| SelectionError::MalformedTotal(raw.to_owned()))?
            }
        };
        Ok(Self {
            items,
            item_subtotal,
        })
    }

    /// Like [`CartSelection::from_params`], but forgiving.
    ///
    /// A malformed item list yields an empty selection. A malformed total
    /// only zeroes the subtotal; the items are kept. The first problem found
    /// is returned alongside.
    #[must_use]
    pub fn from_params_or_empty(params: &CheckoutParams) -> (Self, Option<SelectionError>) {
        let items = match params.products_selected.as_deref() {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<SelectedItem>>(raw) {
                Ok(items) => items,
                Err(e) => {
                    return (
                        Self::default(),
                        Some(SelectionError::MalformedItems(e.to_string())),
                    );
                }
            },
        };
        let (item_subtotal, error) = match params.total_price.as_deref() {
            None => (Price::ZERO, None),
            Some(raw) => match Price::parse(raw) {
                Some(total) => (total, None),
                None => (
                    Price::ZERO,
                    Some(SelectionError::MalformedTotal(raw.to_owned())),
                ),
            },
        };
        (
            Self {
                items,
                item_subtotal,
            },
            error,
        )
    }

    /// A one-item selection, as built by a "buy now" button.
    #[must_use]
    pub fn single(item: SelectedItem) -> Self {
        let item_subtotal = item.line_price();
        Self {
            items: vec![item],
            item_subtotal,
        }
    }

    /// Encode back into navigation parameters.
    #[must_use]
    pub fn to_params(&self) -> CheckoutParams {
        CheckoutParams {
            products_selected: Some(
                serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string()),
            ),
            total_price: Some(self.item_subtotal.amount().normalize().to_string()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentType {
    #[serde(rename = "_id")]
    pub id: PaymentTypeId,
    pub name: String,
}

/// A delivery method and what it costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryType {
    #[serde(rename = "_id")]
    pub id: DeliveryTypeId,
    pub name: String,
    #[serde(default)]
    pub price: Price,
}

/// A city a delivery address can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "_id")]
    pub id: CityId,
    pub name: String,
}

/// The order-creation payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_items: Vec<SelectedItem>,
    pub items_price: Price,
    pub payment_method: PaymentTypeId,
    pub delivery_method: DeliveryTypeId,
    pub user: UserId,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub shipping_price: Price,
    pub total_price: Price,
}

/// Everything the checkout page knows about one checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutState {
    pub selection: CartSelection,
    pub payment_types: Remote<Vec<PaymentType>>,
    pub delivery_types: Remote<Vec<DeliveryType>>,
    pub cities: Remote<Vec<City>>,
    pub selected_payment: Option<PaymentTypeId>,
    pub selected_delivery: Option<DeliveryTypeId>,
}

impl CheckoutState {
    /// Start a checkout; all reference data is still loading.
    #[must_use]
    pub fn new(selection: CartSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Record the payment type fetch. Pre-selects the first entry if the
    /// shopper has not picked one.
    pub fn payment_types_arrived(&mut self, payment_types: Remote<Vec<PaymentType>>) {
        if self.selected_payment.is_none() {
            self.selected_payment = payment_types.items().first().map(|p| p.id.clone());
        }
        self.payment_types = payment_types;
    }

    /// Record the delivery type fetch. Pre-selects the first entry if the
    /// shopper has not picked one.
    pub fn delivery_types_arrived(&mut self, delivery_types: Remote<Vec<DeliveryType>>) {
        if self.selected_delivery.is_none() {
            self.selected_delivery = delivery_types.items().first().map(|d| d.id.clone());
        }
        self.delivery_types = delivery_types;
    }

    pub fn cities_arrived(&mut self, cities: Remote<Vec<City>>) {
        self.cities = cities;
    }

    pub fn select_payment(&mut self, id: PaymentTypeId) {
        self.selected_payment = Some(id);
    }

    pub fn select_delivery(&mut self, id: DeliveryTypeId) {
        self.selected_delivery = Some(id);
    }

    #[must_use]
    pub const fn item_subtotal(&self) -> Price {
        self.selection.item_subtotal
    }

    /// Price of the selected delivery type; zero if nothing is selected or
    /// the id is unknown.
    #[must_use]
    pub fn shipping_price(&self) -> Price {
        self.selected_delivery
            .as_ref()
            .and_then(|selected| {
                self.delivery_types
                    .items()
                    .iter()
                    .find(|d| &d.id == selected)
            })
            .map_or(Price::ZERO, |d| d.price)
    }

    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.item_subtotal() + self.shipping_price()
    }

    /// Name of a city, if the city list loaded and contains it.
    #[must_use]
    pub fn city_name(&self, id: &CityId) -> Option<&str> {
        self.cities
            .items()
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Assemble the order payload for `user`.
    ///
    /// Address fields come from the user's default address and are empty
    /// strings when there is none.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if nothing is selected, a payment or delivery
    /// method is missing, or the selected delivery method cannot be priced
    /// because the delivery list failed, is still loading or lacks it.
    pub fn build_order(
        &self,
        user: &UserProfile,
        locale: Locale,
    ) -> Result<OrderDraft, CheckoutError> {
        if self.selection.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }
        let payment_method = self
            .selected_payment
            .clone()
            .ok_or(CheckoutError::MissingPaymentMethod)?;
        let delivery_method = self
            .selected_delivery
            .clone()
            .ok_or(CheckoutError::MissingDeliveryMethod)?;
        let Remote::Loaded(delivery_types) = &self.delivery_types else {
            return Err(CheckoutError::DeliveryPricesUnavailable);
        };
        if !delivery_types.iter().any(|d| d.id == delivery_method) {
            return Err(CheckoutError::UnknownDeliveryMethod(delivery_method));
        }

        let address = user.default_address();
        let shipping_price = self.shipping_price();

        Ok(OrderDraft {
            order_items: self.selection.items.clone(),
            items_price: self.item_subtotal(),
            payment_method,
            delivery_method,
            user: user.id.clone(),
            full_name: address.map(|a| a.full_name(locale)).unwrap_or_default(),
            address: address.map(|a| a.address.clone()).unwrap_or_default(),
            city: address
                .and_then(|a| a.city.as_ref())
                .map(|c| c.as_str().to_owned())
                .unwrap_or_default(),
            phone: address.map(|a| a.phone_number.clone()).unwrap_or_default(),
            shipping_price,
            total_price: self.item_subtotal() + shipping_price,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::user::Address;

    fn params(items: Option<&str>, total: Option<&str>) -> CheckoutParams {
        CheckoutParams {
            products_selected: items.map(String::from),
            total_price: total.map(String::from),
        }
    }

    fn deliveries() -> Vec<DeliveryType> {
        vec![
            DeliveryType {
                id: DeliveryTypeId::new("standard"),
                name: "Standard".to_string(),
                price: Price::from_dong(30_000),
            },
            DeliveryType {
                id: DeliveryTypeId::new("express"),
                name: "Express".to_string(),
                price: Price::from_dong(50_000),
            },
        ]
    }

    fn payments() -> Vec<PaymentType> {
        vec![
            PaymentType {
                id: PaymentTypeId::new("cod"),
                name: "Cash on delivery".to_string(),
            },
            PaymentType {
                id: PaymentTypeId::new("vnpay"),
                name: "VNPay".to_string(),
            },
        ]
    }

    fn user(addresses: Vec<Address>) -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            email: "an@example.com".to_string(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            role: crate::user::UserRole::default(),
            addresses,
        }
    }

    fn scenario_state() -> CheckoutState {
        let selection = CartSelection::from_params(&params(
            Some(r#"[{"id":"p1","price":100000,"discount":10,"amount":2}]"#),
            Some("200000"),
        ))
        .unwrap();
        let mut state = CheckoutState::new(selection);
        state.payment_types_arrived(Remote::Loaded(payments()));
        state.delivery_types_arrived(Remote::Loaded(deliveries()));
        state
    }

    #[test]
    fn test_scenario_totals() {
        let state = scenario_state();
        assert_eq!(state.item_subtotal(), Price::from_dong(200_000));
        assert_eq!(state.shipping_price(), Price::from_dong(30_000));
        assert_eq!(state.grand_total(), Price::from_dong(230_000));
    }

    #[test]
    fn test_item_subtotal_is_the_navigation_total() {
        // The line price (2 x 90.000) differs from the fixed subtotal.
        let state = scenario_state();
        assert_eq!(state.selection.items[0].line_price(), Price::from_dong(180_000));
        assert_eq!(state.item_subtotal(), Price::from_dong(200_000));
    }

    #[test]
    fn test_empty_selection_total_is_shipping_only() {
        let mut state = CheckoutState::new(CartSelection::default());
        state.delivery_types_arrived(Remote::Loaded(deliveries()));
        assert_eq!(state.grand_total(), Price::from_dong(30_000));
    }

    #[test]
    fn test_grand_total_identity_for_every_delivery() {
        let mut state = scenario_state();
        for delivery in deliveries() {
            state.select_delivery(delivery.id.clone());
            assert_eq!(state.grand_total(), state.item_subtotal() + delivery.price);
        }
    }

    #[test]
    fn test_unknown_delivery_costs_nothing() {
        let mut state = scenario_state();
        state.select_delivery(DeliveryTypeId::new("teleport"));
        assert_eq!(state.shipping_price(), Price::ZERO);
        assert_eq!(state.grand_total(), Price::from_dong(200_000));
    }

    #[test]
    fn test_malformed_params_yield_empty_order() {
        for bad in [
            params(Some("not json"), Some("200000")),
            params(Some(r#"{"id":"p1"}"#), Some("200000")),
            params(Some("[]"), Some("lots")),
        ] {
            let (selection, error) = CartSelection::from_params_or_empty(&bad);
            assert!(selection.items.is_empty());
            assert_eq!(selection.item_subtotal, Price::ZERO);
            assert!(error.is_some());
        }
    }

    #[test]
    fn test_malformed_total_keeps_items() {
        let (selection, error) = CartSelection::from_params_or_empty(&params(
            Some(r#"[{"id":"p1","price":100000,"amount":1}]"#),
            Some("lots"),
        ));
        assert_eq!(selection.items.len(), 1);
        assert_eq!(selection.items[0].product, ProductId::new("p1"));
        assert_eq!(selection.item_subtotal, Price::ZERO);
        assert_eq!(error, Some(SelectionError::MalformedTotal("lots".to_string())));
    }

    #[test]
    fn test_missing_params_yield_empty_order_without_error() {
        let (selection, error) = CartSelection::from_params_or_empty(&CheckoutParams::default());
        assert!(selection.is_empty());
        assert_eq!(selection.item_subtotal, Price::ZERO);
        assert!(error.is_none());
    }

    #[test]
    fn test_first_options_are_preselected_once() {
        let mut state = CheckoutState::new(CartSelection::default());
        assert!(state.selected_payment.is_none());

        state.payment_types_arrived(Remote::Loaded(payments()));
        assert_eq!(state.selected_payment, Some(PaymentTypeId::new("cod")));

        state.select_payment(PaymentTypeId::new("vnpay"));
        state.payment_types_arrived(Remote::Loaded(payments()));
        assert_eq!(state.selected_payment, Some(PaymentTypeId::new("vnpay")));
    }

    #[test]
    fn test_one_failed_fetch_leaves_others_intact() {
        let mut state = CheckoutState::new(CartSelection::default());
        state.payment_types_arrived(Remote::Failed("connection refused".to_string()));
        state.delivery_types_arrived(Remote::Loaded(deliveries()));
        state.cities_arrived(Remote::Loaded(vec![City {
            id: CityId::new("hcm"),
            name: "Ho Chi Minh".to_string(),
        }]));

        assert!(state.payment_types.items().is_empty());
        assert_eq!(state.payment_types.failure(), Some("connection refused"));
        assert!(state.selected_payment.is_none());
        assert_eq!(state.delivery_types.items().len(), 2);
        assert_eq!(state.city_name(&CityId::new("hcm")), Some("Ho Chi Minh"));
    }

    #[test]
    fn test_order_without_default_address_has_empty_address_fields() {
        let state = scenario_state();
        let order = state.build_order(&user(vec![]), Locale::Vi).unwrap();

        assert_eq!(order.full_name, "");
        assert_eq!(order.address, "");
        assert_eq!(order.city, "");
        assert_eq!(order.phone, "");
        assert_eq!(order.total_price, Price::from_dong(230_000));
        assert_eq!(order.payment_method, PaymentTypeId::new("cod"));
        assert_eq!(order.delivery_method, DeliveryTypeId::new("standard"));
    }

    #[test]
    fn test_order_uses_default_address() {
        let state = scenario_state();
        let address = Address {
            first_name: "An".to_string(),
            middle_name: "Van".to_string(),
            last_name: "Nguyen".to_string(),
            address: "2 Tran Phu".to_string(),
            city: Some(CityId::new("hcm")),
            phone_number: "0900000000".to_string(),
            is_default: true,
        };
        let order = state
            .build_order(&user(vec![Address::default(), address]), Locale::En)
            .unwrap();

        assert_eq!(order.full_name, "An Van Nguyen");
        assert_eq!(order.address, "2 Tran Phu");
        assert_eq!(order.city, "hcm");
        assert_eq!(order.phone, "0900000000");
    }

    #[test]
    fn test_order_payload_shape() {
        let state = scenario_state();
        let order = state.build_order(&user(vec![]), Locale::Vi).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["orderItems"][0]["product"], "p1");
        assert_eq!(json["paymentMethod"], "cod");
        assert_eq!(json["deliveryMethod"], "standard");
        assert_eq!(json["user"], "u1");
        assert!(json["itemsPrice"].is_number());
        assert!(json["shippingPrice"].is_number());
        assert!(json["totalPrice"].is_number());
    }

    #[test]
    fn test_order_requires_items_and_methods() {
        let state = CheckoutState::new(CartSelection::default());
        assert_eq!(
            state.build_order(&user(vec![]), Locale::Vi),
            Err(CheckoutError::EmptySelection)
        );

        let mut state = scenario_state();
        state.selected_payment = None;
        assert_eq!(
            state.build_order(&user(vec![]), Locale::Vi),
            Err(CheckoutError::MissingPaymentMethod)
        );
    }

    #[test]
    fn test_order_rejects_unknown_delivery() {
        let mut state = scenario_state();
        state.select_delivery(DeliveryTypeId::new("teleport"));
        assert_eq!(
            state.build_order(&user(vec![]), Locale::Vi),
            Err(CheckoutError::UnknownDeliveryMethod(DeliveryTypeId::new(
                "teleport"
            )))
        );
    }

    #[test]
    fn test_order_needs_loaded_delivery_prices() {
        let mut state = scenario_state();
        state.select_delivery(DeliveryTypeId::new("express"));
        state.delivery_types_arrived(Remote::Failed("connection refused".to_string()));
        assert_eq!(
            state.build_order(&user(vec![]), Locale::Vi),
            Err(CheckoutError::DeliveryPricesUnavailable)
        );

        state.delivery_types_arrived(Remote::Loading);
        assert_eq!(
            state.build_order(&user(vec![]), Locale::Vi),
            Err(CheckoutError::DeliveryPricesUnavailable)
        );
    }

    #[test]
    fn test_single_selection_params() {
        let selection = CartSelection::single(SelectedItem {
            product: ProductId::new("p9"),
            name: "Tea".to_string(),
            price: Price::from_dong(50_000),
            discount: 20,
            amount: 1,
            image: String::new(),
        });
        let params = selection.to_params();
        assert_eq!(params.total_price.as_deref(), Some("40000"));

        let parsed = CartSelection::from_params(&params).unwrap();
        assert_eq!(parsed.items, selection.items);
        assert_eq!(parsed.item_subtotal, Price::from_dong(40_000));
    }
}
