//! Permission names understood by the backend.
//!
//! Roles carry a list of these strings. `ADMIN` is the super-permission: a
//! role holding it passes every ACL check.

/// Grants every ability on every subject.
pub const ADMIN: &str = "ADMIN.GRANTED";

/// Baseline permission for ordinary customers.
pub const BASIC: &str = "BASIC.PUBLIC";

/// Access to the back-office dashboard. Attached to every newly created role.
pub const DASHBOARD: &str = "DASHBOARD";

/// Role management permissions.
pub mod role {
    /// List and open roles.
    pub const VIEW: &str = "SYSTEM.ROLE.VIEW";
    /// Create roles.
    pub const CREATE: &str = "SYSTEM.ROLE.CREATE";
    /// Rename roles.
    pub const UPDATE: &str = "SYSTEM.ROLE.UPDATE";
}

/// Permissions attached to a role created from the back-office form.
pub const DEFAULT_ROLE_PERMISSIONS: &[&str] = &[DASHBOARD];
