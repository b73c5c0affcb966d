//! Per-resource fetch state.

/// The state of one independently fetched resource.
///
/// Failure is kept distinct from an empty result so pages can say
/// "could not load delivery options" instead of silently showing none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Remote<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Remote<T> {
    /// Convert a fetch result, keeping the error's message.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub const fn as_loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T> Remote<Vec<T>> {
    /// Loaded items, or an empty slice while loading or after a failure.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_is_distinct_from_empty() {
        let empty: Remote<Vec<u8>> = Remote::from_result(Ok::<_, String>(vec![]));
        let failed: Remote<Vec<u8>> = Remote::from_result(Err("timeout".to_string()));

        assert!(empty.items().is_empty());
        assert!(failed.items().is_empty());
        assert_eq!(empty.failure(), None);
        assert_eq!(failed.failure(), Some("timeout"));
    }

    #[test]
    fn test_default_is_loading() {
        let state: Remote<Vec<u8>> = Remote::default();
        assert!(state.is_loading());
        assert!(state.as_loaded().is_none());
    }
}
