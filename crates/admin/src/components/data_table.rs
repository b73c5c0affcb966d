//! Data table component types.
//!
//! These types describe the columns, search box and empty state of a list
//! page. The template walks the config; handlers only pick the rows.

/// Sort direction carried in the `order` query parameter as `"<key> <dir>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Parse an `order` value into its column key and direction.
///
/// Unknown or missing directions read as ascending.
#[must_use]
pub fn parse_order(order: &str) -> Option<(&str, SortDirection)> {
    let mut parts = order.split_whitespace();
    let key = parts.next()?;
    let direction = match parts.next() {
        Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Some((key, direction))
}

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Unique key for the column, also the backend sort field.
    pub key: &'static str,
    /// Display label for the column header.
    pub label: &'static str,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub const fn sortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }

    /// The `order` value a click on this header should request.
    ///
    /// Clicking the active column flips its direction; any other column
    /// starts ascending.
    #[must_use]
    pub fn next_order(&self, current: &str) -> String {
        let direction = match parse_order(current) {
            Some((key, direction)) if key == self.key => direction.flipped(),
            _ => SortDirection::Asc,
        };
        format!("{} {}", self.key, direction.as_str())
    }

    /// Header arrow for the current order, empty when not sorted by this column.
    #[must_use]
    pub fn indicator(&self, current: &str) -> &'static str {
        match parse_order(current) {
            Some((key, SortDirection::Asc)) if key == self.key => "▲",
            Some((key, SortDirection::Desc)) if key == self.key => "▼",
            _ => "",
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Unique table identifier, used as the element id.
    pub table_id: &'static str,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Search placeholder text.
    pub search_placeholder: &'static str,
    /// Title for empty state.
    pub empty_title: &'static str,
    /// Description for empty state.
    pub empty_description: Option<&'static str>,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub const fn new(table_id: &'static str) -> Self {
        Self {
            table_id,
            columns: Vec::new(),
            search_placeholder: "Search...",
            empty_title: "No items found",
            empty_description: None,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &'static str) -> Self {
        self.search_placeholder = placeholder;
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &'static str, description: Option<&'static str>) -> Self {
        self.empty_title = title;
        self.empty_description = description;
        self
    }

    /// Whether `key` names a sortable column. Anything else is dropped from
    /// the query before it reaches the backend.
    #[must_use]
    pub fn sorts_by(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.sortable && c.key == key)
    }
}

/// Build the roles table configuration.
#[must_use]
pub fn roles_table_config() -> DataTableConfig {
    DataTableConfig::new("roles")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("permissions", "Permissions"))
        .column(TableColumn::sortable("createdAt", "Created"))
        .column(TableColumn::new("actions", ""))
        .search_placeholder("Search roles by name...")
        .empty_state("No roles found", Some("Try a different search"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_order_flips_active_column() {
        let name = TableColumn::sortable("name", "Name");
        assert_eq!(name.next_order(""), "name asc");
        assert_eq!(name.next_order("name asc"), "name desc");
        assert_eq!(name.next_order("name desc"), "name asc");
        assert_eq!(name.next_order("createdAt desc"), "name asc");
    }

    #[test]
    fn test_indicator() {
        let name = TableColumn::sortable("name", "Name");
        assert_eq!(name.indicator("name desc"), "▼");
        assert_eq!(name.indicator("name"), "▲");
        assert_eq!(name.indicator("createdAt asc"), "");
    }

    #[test]
    fn test_roles_table_sorts_only_declared_columns() {
        let config = roles_table_config();
        assert!(config.sorts_by("name"));
        assert!(config.sorts_by("createdAt"));
        assert!(!config.sorts_by("permissions"));
        assert!(!config.sorts_by("password"));
    }
}
