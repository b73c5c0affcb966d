//! List pagination parameters shared by every backend list endpoint.

use serde::{Deserialize, Serialize};

/// Sentinel the backend reads as "no pagination".
pub const UNPAGINATED: i64 = -1;

/// Default page size for paginated back-office lists.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// `{limit, page}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: i64,
    pub page: i64,
}

impl ListParams {
    /// Request the complete list in one response (`limit=-1&page=-1`).
    pub const ALL: Self = Self {
        limit: UNPAGINATED,
        page: UNPAGINATED,
    };

    /// A specific page, clamped to sane values.
    #[must_use]
    pub fn page(page: i64, limit: i64) -> Self {
        Self {
            limit: if limit > 0 { limit } else { DEFAULT_PAGE_SIZE },
            page: page.max(1),
        }
    }

    #[must_use]
    pub const fn is_unpaginated(&self) -> bool {
        self.limit == UNPAGINATED && self.page == UNPAGINATED
    }

    /// Query pairs in the order the backend documents them.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("limit", self.limit.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::page(1, DEFAULT_PAGE_SIZE)
    }
}

/// Page count for a total item count.
#[must_use]
pub fn total_pages(total_count: u64, limit: i64) -> u64 {
    let limit = u64::try_from(limit).unwrap_or(0);
    if limit == 0 {
        return 1;
    }
    total_count.div_ceil(limit).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_unpaginated() {
        assert!(ListParams::ALL.is_unpaginated());
        assert_eq!(
            ListParams::ALL.query_pairs(),
            [("limit", "-1".to_string()), ("page", "-1".to_string())]
        );
    }

    #[test]
    fn test_page_clamps() {
        assert_eq!(ListParams::page(0, 0), ListParams { limit: 10, page: 1 });
        assert_eq!(ListParams::page(3, 25), ListParams { limit: 25, page: 3 });
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, -1), 1);
    }
}
