//! Roles and the create/edit modal.
//!
//! The modal is a small state machine. Handlers drive it one transition per
//! request and render whatever state it ends in:
//!
//! ```text
//! Closed ──open──▶ Open(Create | Edit(id)) ──submit──▶ Submitting
//!                      ▲                                  │
//!                      └────────── failed ◀───────────────┤
//!                                                          └── succeeded ──▶ Closed
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::ListParams;
use crate::permissions;
use crate::types::RoleId;

/// Form validation failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RoleFormError {
    #[error("Role name is required")]
    NameRequired,
}

/// A role as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of the role list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePage {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub total_page: u64,
    #[serde(default)]
    pub total_count: u64,
}

/// Role list query. Every field takes part in the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleListParams {
    pub order: String,
    pub search: String,
    pub list: ListParams,
}

impl RoleListParams {
    /// Query pairs for the backend; empty `order`/`search` are left out.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.order.is_empty() {
            pairs.push(("order", self.order.clone()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs.extend(self.list.query_pairs());
        pairs
    }
}

/// `POST /roles` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRole {
    pub name: String,
    pub permissions: Vec<String>,
}

/// `PUT /roles/{id}` body. Editing only renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRole {
    pub name: String,
}

/// Validate a role name, returning it trimmed.
///
/// # Errors
///
/// Returns `RoleFormError::NameRequired` for blank input.
pub fn validate_name(raw: &str) -> Result<String, RoleFormError> {
    let name = raw.trim();
    if name.is_empty() {
        Err(RoleFormError::NameRequired)
    } else {
        Ok(name.to_owned())
    }
}

/// Whether the modal creates a new role or renames an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(RoleId),
}

impl ModalMode {
    #[must_use]
    pub const fn role_id(&self) -> Option<&RoleId> {
        match self {
            Self::Create => None,
            Self::Edit(id) => Some(id),
        }
    }
}

/// The single field the modal edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub name: String,
}

/// A mutation the modal asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCommand {
    Create(CreateRole),
    Update { id: RoleId, body: UpdateRole },
}

/// The modal's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoleModal {
    #[default]
    Closed,
    Open {
        mode: ModalMode,
        form: RoleForm,
        error: Option<RoleFormError>,
    },
    Submitting {
        mode: ModalMode,
        form: RoleForm,
    },
}

impl RoleModal {
    /// Open the modal. The mode depends only on whether an id is given.
    #[must_use]
    pub fn open(id: Option<RoleId>) -> Self {
        Self::Open {
            mode: id.map_or(ModalMode::Create, ModalMode::Edit),
            form: RoleForm::default(),
            error: None,
        }
    }

    /// Reopen with a form already filled in, as when a submit comes back from
    /// the browser.
    #[must_use]
    pub fn with_form(id: Option<RoleId>, form: RoleForm) -> Self {
        let mut modal = Self::open(id);
        modal.set_name(form.name);
        modal
    }

    #[must_use]
    pub const fn mode(&self) -> Option<&ModalMode> {
        match self {
            Self::Closed => None,
            Self::Open { mode, .. } | Self::Submitting { mode, .. } => Some(mode),
        }
    }

    /// The role to fetch before the form can be shown; `None` in create mode.
    #[must_use]
    pub const fn prefetch_id(&self) -> Option<&RoleId> {
        match self.mode() {
            Some(mode) => mode.role_id(),
            None => None,
        }
    }

    #[must_use]
    pub const fn form(&self) -> Option<&RoleForm> {
        match self {
            Self::Closed => None,
            Self::Open { form, .. } | Self::Submitting { form, .. } => Some(form),
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<RoleFormError> {
        match self {
            Self::Open { error, .. } => *error,
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Populate the form from the fetched role.
    ///
    /// Ignored unless the modal is open in edit mode for this very role.
    pub fn role_loaded(&mut self, role: &Role) {
        if let Self::Open {
            mode: ModalMode::Edit(id),
            form,
            error,
        } = self
            && *id == role.id
        {
            form.name.clone_from(&role.name);
            *error = None;
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Self::Open { form, .. } = self {
            form.name = name.into();
        }
    }

    /// Run validation and record the outcome on the open form.
    ///
    /// Returns the trimmed name on success.
    ///
    /// # Errors
    ///
    /// Returns `RoleFormError::NameRequired` for a blank name, or when the
    /// modal is not open.
    pub fn validate(&mut self) -> Result<String, RoleFormError> {
        match self {
            Self::Open { form, error, .. } => {
                let result = validate_name(&form.name);
                *error = result.as_ref().err().copied();
                result
            }
            _ => Err(RoleFormError::NameRequired),
        }
    }

    /// Validate and, if clean, move to `Submitting` and return the mutation.
    ///
    /// Returns `None` and stays open when validation fails.
    pub fn submit(&mut self) -> Option<RoleCommand> {
        let name = self.validate().ok()?;
        let Self::Open { mode, form, .. } = std::mem::take(self) else {
            return None;
        };

        let command = match &mode {
            ModalMode::Create => RoleCommand::Create(CreateRole {
                name,
                permissions: permissions::DEFAULT_ROLE_PERMISSIONS
                    .iter()
                    .map(|p| (*p).to_owned())
                    .collect(),
            }),
            ModalMode::Edit(id) => RoleCommand::Update {
                id: id.clone(),
                body: UpdateRole { name },
            },
        };
        *self = Self::Submitting { mode, form };
        Some(command)
    }

    /// The mutation went through. The modal closes and the form is gone.
    pub fn succeeded(&mut self) {
        self.close();
    }

    /// The mutation failed. Back to the open form with the entered name kept.
    pub fn failed(&mut self) {
        if let Self::Submitting { mode, form } = std::mem::take(self) {
            *self = Self::Open {
                mode,
                form,
                error: None,
            };
        }
    }

    /// Close from any state, discarding the form.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: RoleId::new(id),
            name: name.to_string(),
            permissions: vec![],
            created_at: None,
        }
    }

    #[test]
    fn test_open_without_id_is_empty_create_form() {
        let modal = RoleModal::open(None);
        assert_eq!(modal.mode(), Some(&ModalMode::Create));
        assert_eq!(modal.form().unwrap().name, "");
        assert!(modal.prefetch_id().is_none());
    }

    #[test]
    fn test_open_with_id_prefetches_and_fills_form() {
        let mut modal = RoleModal::open(Some(RoleId::new("r1")));
        assert_eq!(modal.prefetch_id(), Some(&RoleId::new("r1")));
        assert_eq!(modal.form().unwrap().name, "");

        modal.role_loaded(&role("r1", "Editor"));
        assert_eq!(modal.form().unwrap().name, "Editor");
    }

    #[test]
    fn test_role_loaded_ignores_other_roles_and_create_mode() {
        let mut modal = RoleModal::open(Some(RoleId::new("r1")));
        modal.role_loaded(&role("r2", "Other"));
        assert_eq!(modal.form().unwrap().name, "");

        let mut modal = RoleModal::open(None);
        modal.role_loaded(&role("r1", "Editor"));
        assert_eq!(modal.form().unwrap().name, "");
    }

    #[test]
    fn test_close_always_clears_form() {
        let mut modal = RoleModal::open(Some(RoleId::new("r1")));
        modal.role_loaded(&role("r1", "Editor"));
        modal.close();
        assert!(modal.form().is_none());

        let reopened = RoleModal::open(None);
        assert_eq!(reopened.form().unwrap().name, "");
    }

    #[test]
    fn test_blank_name_blocks_submit() {
        let mut modal = RoleModal::with_form(None, RoleForm { name: "   ".into() });
        assert!(modal.submit().is_none());
        assert!(modal.is_open());
        assert_eq!(modal.error(), Some(RoleFormError::NameRequired));
    }

    #[test]
    fn test_validate_trims_and_rejects_closed_modal() {
        let mut modal = RoleModal::with_form(None, RoleForm { name: " Editor ".into() });
        assert_eq!(modal.validate(), Ok("Editor".to_string()));
        assert_eq!(modal.error(), None);

        modal.close();
        assert_eq!(modal.validate(), Err(RoleFormError::NameRequired));
    }

    #[test]
    fn test_create_always_attaches_dashboard_permission() {
        let mut modal = RoleModal::with_form(None, RoleForm { name: " Editor ".into() });
        let command = modal.submit().unwrap();

        assert_eq!(
            command,
            RoleCommand::Create(CreateRole {
                name: "Editor".to_string(),
                permissions: vec![permissions::DASHBOARD.to_string()],
            })
        );
        assert!(matches!(modal, RoleModal::Submitting { .. }));
    }

    #[test]
    fn test_edit_only_renames() {
        let id = RoleId::new("r1");
        let mut modal = RoleModal::with_form(Some(id.clone()), RoleForm { name: "Staff".into() });
        let command = modal.submit().unwrap();
        assert_eq!(
            command,
            RoleCommand::Update {
                id,
                body: UpdateRole {
                    name: "Staff".to_string()
                }
            }
        );
    }

    #[test]
    fn test_failure_reopens_with_entered_name() {
        let mut modal = RoleModal::with_form(None, RoleForm { name: "Editor".into() });
        modal.submit().unwrap();
        modal.failed();

        assert!(modal.is_open());
        assert_eq!(modal.form().unwrap().name, "Editor");
    }

    #[test]
    fn test_success_closes() {
        let mut modal = RoleModal::with_form(None, RoleForm { name: "Editor".into() });
        modal.submit().unwrap();
        modal.succeeded();
        assert_eq!(modal, RoleModal::Closed);
    }

    #[test]
    fn test_list_params_query_pairs() {
        let params = RoleListParams {
            order: String::new(),
            search: "edit".to_string(),
            list: ListParams::page(2, 10),
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("search", "edit".to_string()),
                ("limit", "10".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_role_page_deserializes() {
        let json = serde_json::json!({
            "roles": [{ "_id": "r1", "name": "Admin", "permissions": ["ADMIN.GRANTED"] }],
            "totalPage": 1,
            "totalCount": 1
        });
        let page: RolePage = serde_json::from_value(json).unwrap();
        assert_eq!(page.roles[0].name, "Admin");
        assert_eq!(page.total_count, 1);
    }
}
