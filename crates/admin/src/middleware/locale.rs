//! Viewer locale from `Accept-Language`.

use app_shop_core::user::Locale;
use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};

use crate::state::AppState;

/// The locale to render names in.
#[derive(Debug, Clone, Copy)]
pub struct ViewerLocale(pub Locale);

impl FromRequestParts<AppState> for ViewerLocale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(Locale::from_accept_language)
            .unwrap_or(state.config().default_locale);

        Ok(Self(locale))
    }
}
