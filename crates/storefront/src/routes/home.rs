//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::layout::Layout;
use crate::middleware::ViewerLocale;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCardView>,
    /// Set when the catalogue could not be loaded.
    pub load_error: Option<String>,
}

/// Display the home page with every public product.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
) -> impl IntoResponse {
    let (products, load_error) = match state.api().public_products().await {
        Ok(products) => (products.iter().map(ProductCardView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to fetch products for home page: {e}");
            (Vec::new(), Some("Products are unavailable right now.".to_string()))
        }
    };

    HomeTemplate {
        layout: Layout::load(&session, locale).await,
        products,
        load_error,
    }
}
