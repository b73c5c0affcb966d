//! Crawler-facing routes: `sitemap.xml` and `robots.txt`.

use app_shop_core::sitemap::{self, SitemapEntry};
use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::state::AppState;

/// `sitemap.xml` template.
#[derive(Template)]
#[template(path = "sitemap.xml")]
pub struct SitemapTemplate {
    pub entries: Vec<SitemapEntry>,
}

/// Serve the sitemap: the home page plus one entry per public product.
///
/// If the catalogue cannot be fetched only the home entry is listed.
#[instrument(skip(state))]
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let products = match state.api().public_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to fetch products for sitemap: {e}");
            Vec::new()
        }
    };

    let entries = sitemap::entries(
        state.config().site_root(),
        products.iter().map(|p| p.slug.as_str()),
        chrono::Utc::now(),
    );

    match (SitemapTemplate { entries }).render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render sitemap: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Serve `robots.txt`.
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::robots_txt(state.config().site_root()),
    )
}
