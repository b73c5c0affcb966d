//! Dashboard route handler.

use app_shop_core::role::RoleListParams;
use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    api::ApiError,
    error::Result,
    filters,
    layout::Layout,
    middleware::{RequireAdmin, ViewerLocale},
    state::AppState,
};

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(index))
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub email: String,
    pub permissions: Vec<String>,
    /// `None` when the viewer may not list roles or the count failed to load.
    pub role_count: Option<u64>,
}

/// Render the dashboard.
///
/// GET /dashboard
#[instrument(skip(state, session, admin))]
async fn index(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Html<String>> {
    let layout = Layout::load(&session, locale).await;

    let role_count = if layout.can_view_roles {
        match state
            .api()
            .roles(admin.token(), &RoleListParams::default())
            .await
        {
            Ok(page) => Some(page.total_count),
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load role count");
                None
            }
        }
    } else {
        None
    };

    let template = DashboardTemplate {
        layout,
        email: admin.profile.email.clone(),
        permissions: admin.permissions().to_vec(),
        role_count,
    };

    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Failed to render dashboard: {e}");
        String::from("Error rendering template")
    })))
}
