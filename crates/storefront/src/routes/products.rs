//! Product route handlers.

use app_shop_core::checkout::CartSelection;
use app_shop_core::product::Product;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::ViewerLocale;
use crate::routes::checkout::checkout_url;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub image: String,
    /// Price after discount.
    pub price: String,
    /// Price before discount, only when discounted.
    pub original_price: Option<String>,
    pub discount: u8,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.discounted_price().to_string(),
            original_price: (product.discount > 0).then(|| product.price.to_string()),
            discount: product.discount,
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductCardView,
    pub description: String,
    pub max_amount: u32,
}

/// "Buy now" form data.
#[derive(Debug, Deserialize)]
pub struct BuyNowForm {
    pub amount: Option<u32>,
}

/// Display one product.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state.api().product_by_slug(&slug).await?;

    Ok(ProductShowTemplate {
        layout: Layout::load(&session, locale).await,
        product: ProductCardView::from(&product),
        description: product.description.clone(),
        max_amount: product.count_in_stock.max(1),
    })
}

/// Go straight to checkout with this product alone.
///
/// The quantity is clamped to what is in stock.
#[instrument(skip(state))]
pub async fn buy_now(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<BuyNowForm>,
) -> Result<Response> {
    let product = state.api().product_by_slug(&slug).await?;
    let amount = form
        .amount
        .unwrap_or(1)
        .clamp(1, product.count_in_stock.max(1));

    let selection = CartSelection::single(product.to_selected(amount));
    Ok(Redirect::to(&checkout_url(&selection.to_params())).into_response())
}
