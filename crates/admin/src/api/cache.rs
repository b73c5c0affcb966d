//! Cache types for backend responses.

use std::time::{Duration, Instant};

use app_shop_core::RoleId;
use app_shop_core::role::{Role, RoleListParams, RolePage};
use moka::Expiry;

/// How long a role list page stays fresh.
const LIST_TTL: Duration = Duration::from_secs(300);

/// Role details back the edit form, so they go stale quickly.
const DETAIL_TTL: Duration = Duration::from_secs(5);

/// Cache key: one variant per read endpoint.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// One role list page; every query parameter is part of the key.
    RoleList(RoleListParams),
    RoleDetail(RoleId),
}

impl CacheKey {
    /// Whether a role mutation makes this entry stale.
    ///
    /// Every list page is affected by any create or rename; a detail entry
    /// only by a change to that role.
    #[must_use]
    pub fn is_stale_after_change_to(&self, changed: Option<&RoleId>) -> bool {
        match self {
            Self::RoleList(_) => true,
            Self::RoleDetail(id) => changed == Some(id),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    RoleList(RolePage),
    RoleDetail(Box<Role>),
}

/// Per-entry time to live.
pub struct CacheExpiry;

impl Expiry<CacheKey, CacheValue> for CacheExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match key {
            CacheKey::RoleList(_) => LIST_TTL,
            CacheKey::RoleDetail(_) => DETAIL_TTL,
        })
    }
}
