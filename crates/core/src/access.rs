//! Page access policies and the guard decision.
//!
//! Every page declares a [`PagePolicy`]: exactly one [`PageAccess`] variant,
//! the permissions that unlock it, and the [`Ability`] it needs. [`decide`]
//! turns a policy plus the current viewer into a single [`GuardDecision`].
//! The decision is a plain value; the web layer turns it into a redirect or a
//! 403 page.
//!
//! Evaluation order:
//!
//! 1. Session gate from [`PageAccess`] (may redirect).
//! 2. ACL filter, always applied (may yield [`GuardDecision::NotAuthorized`]).

use serde::{Deserialize, Serialize};

use crate::permissions;

/// Subject name that matches every subject.
pub const ALL_SUBJECTS: &str = "all";

/// Who may reach a page, before permissions are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAccess {
    /// Only visitors without a session (sign-in page).
    GuestOnly,
    /// Signed-in users only.
    Authenticated,
    /// Everyone.
    Public,
}

impl PageAccess {
    /// Resolve the legacy `(auth_guard, guest_guard)` flag pair.
    ///
    /// Guest-only wins when both flags are set; two cleared flags mean a
    /// public page.
    #[must_use]
    pub const fn from_flags(auth_guard: bool, guest_guard: bool) -> Self {
        if guest_guard {
            Self::GuestOnly
        } else if !auth_guard {
            Self::Public
        } else {
            Self::Authenticated
        }
    }
}

/// Verb half of an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Matches every other action.
    Manage,
    Read,
    Create,
    Update,
    Delete,
}

/// An `(action, subject)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ability {
    pub action: Action,
    pub subject: &'static str,
}

impl Ability {
    /// `manage` on `all`, the ability pages require unless they say otherwise.
    pub const MANAGE_ALL: Self = Self {
        action: Action::Manage,
        subject: ALL_SUBJECTS,
    };

    #[must_use]
    pub const fn new(action: Action, subject: &'static str) -> Self {
        Self { action, subject }
    }

    /// Whether this granted rule covers the requested ability.
    #[must_use]
    pub fn covers(&self, requested: &Self) -> bool {
        let action_ok = self.action == Action::Manage || self.action == requested.action;
        let subject_ok = self.subject == ALL_SUBJECTS || self.subject == requested.subject;
        action_ok && subject_ok
    }
}

impl Default for Ability {
    fn default() -> Self {
        Self::MANAGE_ALL
    }
}

/// Static access declaration attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    pub access: PageAccess,
    /// Any one of these unlocks the page. Empty means no permission needed.
    pub permissions: &'static [&'static str],
    pub ability: Ability,
}

impl PagePolicy {
    /// A page anyone can see.
    #[must_use]
    pub const fn public() -> Self {
        Self::new(PageAccess::Public)
    }

    /// A page only visitors without a session can see.
    #[must_use]
    pub const fn guest_only() -> Self {
        Self::new(PageAccess::GuestOnly)
    }

    /// A page that needs a signed-in user.
    #[must_use]
    pub const fn authenticated() -> Self {
        Self::new(PageAccess::Authenticated)
    }

    const fn new(access: PageAccess) -> Self {
        Self {
            access,
            permissions: &[],
            ability: Ability::MANAGE_ALL,
        }
    }

    /// Require one of the given permissions.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: &'static [&'static str]) -> Self {
        self.permissions = permissions;
        self
    }

    /// Require a specific ability instead of `manage`/`all`.
    #[must_use]
    pub const fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = ability;
        self
    }
}

/// Abilities resolved for one viewer against one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abilities {
    rules: Vec<Ability>,
}

impl Abilities {
    /// Build the rule set for a user's permissions and a page's required list.
    ///
    /// `manage`/`all` is granted when the page requires nothing, when the user
    /// holds [`permissions::ADMIN`], or when the user holds any required
    /// permission. Otherwise nothing is granted.
    #[must_use]
    pub fn resolve(user_permissions: &[String], required: &[&str]) -> Self {
        let is_admin = user_permissions.iter().any(|p| p == permissions::ADMIN);
        let matches_required = required
            .iter()
            .any(|needed| user_permissions.iter().any(|p| p == needed));

        if required.is_empty() || is_admin || matches_required {
            Self {
                rules: vec![Ability::MANAGE_ALL],
            }
        } else {
            Self::default()
        }
    }

    /// Check a requested ability.
    #[must_use]
    pub fn can(&self, requested: &Ability) -> bool {
        self.rules.iter().any(|rule| rule.covers(requested))
    }
}

/// What the guard layer should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the page.
    Render,
    /// Send the visitor to sign in, then back to `return_url`.
    RedirectToLogin { return_url: String },
    /// Signed-in user on a guest-only page.
    RedirectHome,
    /// Session is fine but the ACL check failed.
    NotAuthorized,
}

/// Decide what to do with a request.
///
/// `viewer` is `None` for guests and `Some(permissions)` for signed-in users.
/// `path` is the requested path and query, used as the post-login return URL.
#[must_use]
pub fn decide(policy: &PagePolicy, viewer: Option<&[String]>, path: &str) -> GuardDecision {
    match (policy.access, viewer) {
        (PageAccess::GuestOnly, Some(_)) => return GuardDecision::RedirectHome,
        (PageAccess::Authenticated, None) => {
            return GuardDecision::RedirectToLogin {
                return_url: path.to_owned(),
            };
        }
        _ => {}
    }

    let abilities = Abilities::resolve(viewer.unwrap_or_default(), policy.permissions);
    if abilities.can(&policy.ability) {
        GuardDecision::Render
    } else {
        GuardDecision::NotAuthorized
    }
}

/// Accept a post-login return URL only if it stays on this site.
///
/// Relative paths starting with a single `/` pass; absolute URLs,
/// protocol-relative `//host` and backslash tricks are rejected.
#[must_use]
pub fn safe_return_url(candidate: &str) -> Option<&str> {
    let ok = candidate.starts_with('/')
        && !candidate.starts_with("//")
        && !candidate.contains('\\')
        && !candidate.chars().any(char::is_control);
    ok.then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn test_flags_resolve_to_exactly_one_access() {
        assert_eq!(PageAccess::from_flags(false, true), PageAccess::GuestOnly);
        assert_eq!(PageAccess::from_flags(true, true), PageAccess::GuestOnly);
        assert_eq!(PageAccess::from_flags(false, false), PageAccess::Public);
        assert_eq!(PageAccess::from_flags(true, false), PageAccess::Authenticated);
    }

    #[test]
    fn test_guest_only_page() {
        let policy = PagePolicy::guest_only();
        assert_eq!(decide(&policy, None, "/login"), GuardDecision::Render);
        assert_eq!(
            decide(&policy, Some(&perms(&[])), "/login"),
            GuardDecision::RedirectHome
        );
    }

    #[test]
    fn test_public_page_renders_for_everyone() {
        let policy = PagePolicy::public();
        assert_eq!(decide(&policy, None, "/"), GuardDecision::Render);
        assert_eq!(
            decide(&policy, Some(&perms(&[permissions::BASIC])), "/"),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_authenticated_page_redirects_guests_with_return_url() {
        let policy = PagePolicy::authenticated();
        assert_eq!(
            decide(&policy, None, "/checkout?totalPrice=1"),
            GuardDecision::RedirectToLogin {
                return_url: "/checkout?totalPrice=1".to_string()
            }
        );
        assert_eq!(
            decide(&policy, Some(&perms(&[])), "/checkout"),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_acl_overlay_blocks_without_permission() {
        let policy = PagePolicy::authenticated().with_permissions(&[permissions::role::VIEW]);
        assert_eq!(
            decide(&policy, Some(&perms(&[permissions::DASHBOARD])), "/system/role"),
            GuardDecision::NotAuthorized
        );
        assert_eq!(
            decide(&policy, Some(&perms(&[permissions::role::VIEW])), "/system/role"),
            GuardDecision::Render
        );
        assert_eq!(
            decide(&policy, Some(&perms(&[permissions::ADMIN])), "/system/role"),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_acl_applies_to_public_pages_too() {
        let policy = PagePolicy::public().with_permissions(&[permissions::DASHBOARD]);
        assert_eq!(decide(&policy, None, "/"), GuardDecision::NotAuthorized);
    }

    #[test]
    fn test_session_gate_runs_before_acl() {
        // A guest on a permission-gated page must be sent to sign in, not shown 403.
        let policy = PagePolicy::authenticated().with_permissions(&[permissions::role::VIEW]);
        assert!(matches!(
            decide(&policy, None, "/system/role"),
            GuardDecision::RedirectToLogin { .. }
        ));
    }

    #[test]
    fn test_ability_matching() {
        let read_roles = Ability::new(Action::Read, "role");
        assert!(Ability::MANAGE_ALL.covers(&read_roles));
        assert!(read_roles.covers(&read_roles));
        assert!(!read_roles.covers(&Ability::new(Action::Update, "role")));
        assert!(!read_roles.covers(&Ability::new(Action::Read, "order")));
    }

    #[test]
    fn test_page_with_narrower_ability() {
        let policy = PagePolicy::authenticated()
            .with_permissions(&[permissions::role::VIEW])
            .with_ability(Ability::new(Action::Read, "role"));
        assert_eq!(policy.ability.subject, "role");
        assert_eq!(
            decide(&policy, Some(&perms(&[permissions::role::VIEW])), "/system/role"),
            GuardDecision::Render
        );
        assert_eq!(
            decide(&policy, Some(&perms(&[])), "/system/role"),
            GuardDecision::NotAuthorized
        );
    }

    #[test]
    fn test_safe_return_url() {
        assert_eq!(safe_return_url("/checkout?x=1"), Some("/checkout?x=1"));
        assert_eq!(safe_return_url("https://evil.example"), None);
        assert_eq!(safe_return_url("//evil.example"), None);
        assert_eq!(safe_return_url("/\\evil.example"), None);
        assert_eq!(safe_return_url(""), None);
    }
}
