//! Role management route handlers.
//!
//! The list is a full page. Create and edit happen in a modal that HTMX swaps
//! into `#role-modal`; each request drives [`RoleModal`] through one
//! transition and renders the state it lands in.

use app_shop_core::RoleId;
use app_shop_core::access::{GuardDecision, PagePolicy, decide};
use app_shop_core::notification::{Notification, messages};
use app_shop_core::pagination::{DEFAULT_PAGE_SIZE, ListParams, total_pages};
use app_shop_core::role::{
    ModalMode, Role, RoleCommand, RoleForm, RoleListParams, RoleModal, validate_name,
};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{ROLE_CREATE_POLICY, ROLE_FORM_POLICY, ROLE_UPDATE_POLICY, ROLE_VIEW_POLICY, guarded};
use crate::api::ApiError;
use crate::components::data_table::parse_order;
use crate::components::{DataTableConfig, roles_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAdmin, SessionExpired, ViewerLocale, navigate, set_flash};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Where the list lives; success paths navigate back here.
const ROLE_LIST_PATH: &str = "/system/role";

/// Build the role router, mounted at `/system/role`.
///
/// Each permission gets its own guarded sub-router; the method routers for
/// `/` are merged so `GET` and `POST` keep separate guards.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(guarded(Router::new().route("/", get(index)), ROLE_VIEW_POLICY))
        .merge(guarded(
            Router::new()
                .route("/", post(create))
                .route("/new", get(new_form)),
            ROLE_CREATE_POLICY,
        ))
        .merge(guarded(
            Router::new()
                .route("/{id}", post(update))
                .route("/{id}/edit", get(edit_form)),
            ROLE_UPDATE_POLICY,
        ))
        .merge(guarded(
            Router::new()
                .route("/validate", post(validate))
                .route("/close", get(close)),
            ROLE_FORM_POLICY,
        ))
}

// =============================================================================
// Query Types
// =============================================================================

/// `{order, search, limit, page}` as sent by the list page.
#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub search: String,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl RoleListQuery {
    /// Normalize into backend parameters. Sorting on a column the table does
    /// not declare sortable is dropped.
    #[must_use]
    pub fn to_params(&self, table: &DataTableConfig) -> RoleListParams {
        let order = parse_order(&self.order)
            .filter(|(key, _)| table.sorts_by(key))
            .map(|(key, direction)| format!("{key} {}", direction.as_str()))
            .unwrap_or_default();

        RoleListParams {
            order,
            search: self.search.trim().to_string(),
            list: ListParams::page(
                self.page.unwrap_or(1),
                self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            ),
        }
    }
}

/// Link to the list with the given parameters.
fn list_href(params: &RoleListParams) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.query_pairs())
        .finish();
    format!("{ROLE_LIST_PATH}?{query}")
}

// =============================================================================
// View Types
// =============================================================================

/// A role row.
#[derive(Clone)]
pub struct RoleRowView {
    pub id: String,
    pub name: String,
    pub permissions: String,
    pub created_on: String,
}

impl From<&Role> for RoleRowView {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name.clone(),
            permissions: role.permissions.join(", "),
            created_on: role
                .created_at
                .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string()),
        }
    }
}

/// A column header with its sort link.
#[derive(Clone)]
pub struct HeaderView {
    pub label: &'static str,
    pub href: Option<String>,
    pub indicator: &'static str,
}

fn header_views(table: &DataTableConfig, params: &RoleListParams) -> Vec<HeaderView> {
    table
        .columns
        .iter()
        .map(|column| HeaderView {
            label: column.label,
            href: column.sortable.then(|| {
                list_href(&RoleListParams {
                    order: column.next_order(&params.order),
                    list: ListParams::page(1, params.list.limit),
                    ..params.clone()
                })
            }),
            indicator: column.indicator(&params.order),
        })
        .collect()
}

fn can(admin: &CurrentAdmin, policy: &PagePolicy) -> bool {
    decide(policy, Some(admin.permissions()), ROLE_LIST_PATH) == GuardDecision::Render
}

// =============================================================================
// Templates
// =============================================================================

/// Role list page.
#[derive(Template, WebTemplate)]
#[template(path = "roles/index.html")]
pub struct RoleListTemplate {
    pub layout: Layout,
    pub table: DataTableConfig,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RoleRowView>,
    pub search: String,
    pub order: String,
    pub limit: i64,
    pub page: i64,
    pub total_pages: u64,
    pub total_count: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub load_error: bool,
    pub can_create: bool,
    pub can_update: bool,
}

/// The create/edit modal fragment. Renders an empty container when closed.
#[derive(Template, WebTemplate)]
#[template(path = "roles/modal.html")]
pub struct RoleModalTemplate {
    pub open: bool,
    pub title: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub name: String,
    pub error: Option<String>,
    pub notice: Option<Notification>,
}

impl RoleModalTemplate {
    #[must_use]
    pub fn from_modal(modal: &RoleModal, notice: Option<Notification>) -> Self {
        let (title, action, submit_label) = match modal.mode() {
            Some(ModalMode::Edit(id)) => (
                "Edit role",
                format!("{ROLE_LIST_PATH}/{}", urlencoding::encode(id.as_str())),
                "Save",
            ),
            _ => ("Create role", ROLE_LIST_PATH.to_string(), "Create"),
        };

        Self {
            open: modal.is_open(),
            title,
            action,
            submit_label,
            name: modal.form().map(|f| f.name.clone()).unwrap_or_default(),
            error: modal.error().map(|e| e.to_string()),
            notice,
        }
    }
}

/// The name input alone, swapped in after blur validation.
#[derive(Template, WebTemplate)]
#[template(path = "roles/name_field.html")]
pub struct RoleNameFieldTemplate {
    pub name: String,
    pub error: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Paginated, searchable role list.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    ViewerLocale(locale): ViewerLocale,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<RoleListQuery>,
) -> Result<Response> {
    let table = roles_table_config();
    let params = query.to_params(&table);

    let (page, load_error) = match state.api().roles(admin.token(), &params).await {
        Ok(page) => (page, false),
        Err(ApiError::Unauthorized) => return Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load roles");
            (Default::default(), true)
        }
    };

    let total_pages = if page.total_page > 0 {
        page.total_page
    } else {
        total_pages(page.total_count, params.list.limit)
    };
    let current = params.list.page;
    let page_href = |n: i64| {
        list_href(&RoleListParams {
            list: ListParams::page(n, params.list.limit),
            ..params.clone()
        })
    };
    let has_next = u64::try_from(current).is_ok_and(|c| c < total_pages);

    Ok(RoleListTemplate {
        layout: Layout::load(&session, locale).await,
        headers: header_views(&table, &params),
        rows: page.roles.iter().map(RoleRowView::from).collect(),
        search: params.search.clone(),
        order: params.order.clone(),
        limit: params.list.limit,
        page: current,
        total_pages,
        total_count: page.total_count,
        previous_href: (current > 1).then(|| page_href(current - 1)),
        next_href: has_next.then(|| page_href(current + 1)),
        load_error,
        can_create: can(&admin, &ROLE_CREATE_POLICY),
        can_update: can(&admin, &ROLE_UPDATE_POLICY),
        table,
    }
    .into_response())
}

/// Open the modal in create mode.
#[instrument]
pub async fn new_form() -> RoleModalTemplate {
    RoleModalTemplate::from_modal(&RoleModal::open(None), None)
}

/// Open the modal in edit mode, prefetching the role's current name.
#[instrument(skip(state, admin, headers), fields(role_id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<RoleId>,
) -> Response {
    let mut modal = RoleModal::open(Some(id));
    let mut notice = None;

    if let Some(id) = modal.prefetch_id().cloned() {
        match state.api().role(admin.token(), &id).await {
            Ok(role) => modal.role_loaded(&role),
            Err(ApiError::Unauthorized) => return session_expired(&headers),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load role for editing");
                notice = Some(Notification::error(e.user_message("Could not load the role.")));
            }
        }
    }

    RoleModalTemplate::from_modal(&modal, notice).into_response()
}

/// Create a role from the modal form.
#[instrument(skip(state, session, admin, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Form(form): Form<RoleForm>,
) -> Response {
    submit(&state, &session, &admin, &headers, RoleModal::with_form(None, form)).await
}

/// Rename a role from the modal form.
#[instrument(skip(state, session, admin, headers, form), fields(role_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<RoleId>,
    Form(form): Form<RoleForm>,
) -> Response {
    submit(&state, &session, &admin, &headers, RoleModal::with_form(Some(id), form)).await
}

/// Validate the name field on blur.
pub async fn validate(Form(form): Form<RoleForm>) -> RoleNameFieldTemplate {
    let error = validate_name(&form.name).err().map(|e| e.to_string());
    RoleNameFieldTemplate {
        name: form.name,
        error,
    }
}

/// Cancel: close the modal and drop whatever was typed.
pub async fn close() -> RoleModalTemplate {
    let mut modal = RoleModal::open(None);
    modal.close();
    RoleModalTemplate::from_modal(&modal, None)
}

/// Run one submit through the modal and the backend.
///
/// Validation errors re-render the open modal without calling the backend. A
/// backend success flashes a toast and sends the browser back to the list,
/// whose cache entries the client has already dropped. A backend failure
/// reopens the modal with the entered name and an error notice.
async fn submit(
    state: &AppState,
    session: &Session,
    admin: &CurrentAdmin,
    headers: &HeaderMap,
    mut modal: RoleModal,
) -> Response {
    let Some(command) = modal.submit() else {
        return RoleModalTemplate::from_modal(&modal, None).into_response();
    };

    let (result, success, failure) = match &command {
        RoleCommand::Create(body) => (
            state.api().create_role(admin.token(), body).await,
            messages::CREATE_ROLE_SUCCESS,
            messages::CREATE_ROLE_ERROR,
        ),
        RoleCommand::Update { id, body } => (
            state.api().update_role(admin.token(), id, body).await,
            messages::UPDATE_ROLE_SUCCESS,
            messages::UPDATE_ROLE_ERROR,
        ),
    };

    match result {
        Ok(()) => {
            modal.succeeded();
            tracing::info!(admin_id = %admin.id(), "Role saved");
            set_flash(session, Notification::success(success)).await;
            navigate(headers, ROLE_LIST_PATH)
        }
        Err(ApiError::Unauthorized) => session_expired(headers),
        Err(e) => {
            tracing::warn!(error = %e, "Role mutation failed");
            modal.failed();
            let notice = Notification::error(e.user_message(failure));
            RoleModalTemplate::from_modal(&modal, Some(notice)).into_response()
        }
    }
}

/// Send the browser to sign in and tell the expiry middleware to drop the
/// stored admin.
fn session_expired(headers: &HeaderMap) -> Response {
    let mut response = navigate(headers, "/login");
    response.extensions_mut().insert(SessionExpired);
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use app_shop_core::role::RoleFormError;

    use super::*;

    #[test]
    fn test_query_drops_unknown_sort_column() {
        let table = roles_table_config();
        let query = RoleListQuery {
            order: "password desc".to_string(),
            search: "  editor ".to_string(),
            limit: None,
            page: Some(0),
        };
        let params = query.to_params(&table);
        assert_eq!(params.order, "");
        assert_eq!(params.search, "editor");
        assert_eq!(params.list, ListParams::page(1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_query_keeps_declared_sort() {
        let query = RoleListQuery {
            order: "name DESC".to_string(),
            ..Default::default()
        };
        assert_eq!(query.to_params(&roles_table_config()).order, "name desc");
    }

    #[test]
    fn test_list_href_carries_every_parameter() {
        let params = RoleListParams {
            order: "name asc".to_string(),
            search: "ops team".to_string(),
            list: ListParams::page(3, 10),
        };
        assert_eq!(
            list_href(&params),
            "/system/role?order=name+asc&search=ops+team&limit=10&page=3"
        );
    }

    #[test]
    fn test_header_sort_links_reset_to_first_page() {
        let params = RoleListParams {
            order: "name asc".to_string(),
            search: String::new(),
            list: ListParams::page(4, 10),
        };
        let headers = header_views(&roles_table_config(), &params);
        let name = headers.iter().find(|h| h.label == "Name").unwrap();
        assert_eq!(
            name.href.as_deref(),
            Some("/system/role?order=name+desc&limit=10&page=1")
        );
        assert_eq!(name.indicator, "▲");
        let permissions = headers.iter().find(|h| h.label == "Permissions").unwrap();
        assert!(permissions.href.is_none());
    }

    #[test]
    fn test_modal_template_create_mode() {
        let template = RoleModalTemplate::from_modal(&RoleModal::open(None), None);
        assert!(template.open);
        assert_eq!(template.action, "/system/role");
        assert_eq!(template.name, "");
    }

    #[test]
    fn test_modal_template_edit_mode_after_failure_keeps_name() {
        let mut modal = RoleModal::with_form(
            Some(RoleId::new("r1")),
            RoleForm {
                name: "Ops".to_string(),
            },
        );
        modal.submit().unwrap();
        modal.failed();

        let template = RoleModalTemplate::from_modal(
            &modal,
            Some(Notification::error(messages::UPDATE_ROLE_ERROR)),
        );
        assert_eq!(template.action, "/system/role/r1");
        assert_eq!(template.name, "Ops");
        assert!(template.notice.unwrap().is_error());
    }

    #[test]
    fn test_modal_template_shows_validation_error() {
        let mut modal = RoleModal::with_form(None, RoleForm::default());
        assert!(modal.submit().is_none());
        let template = RoleModalTemplate::from_modal(&modal, None);
        assert_eq!(
            template.error.as_deref(),
            Some(RoleFormError::NameRequired.to_string().as_str())
        );
    }

    #[test]
    fn test_closed_modal_renders_empty_container() {
        let html = RoleModalTemplate::from_modal(&RoleModal::Closed, None)
            .render()
            .unwrap();
        assert!(html.contains("id=\"role-modal\""));
        assert!(!html.contains("<form"));
    }
}
