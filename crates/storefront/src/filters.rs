//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a discount percentage as a badge label.
///
/// Usage in templates: `{{ item.discount|percent_off }}` renders `-10%`.
#[askama::filter_fn]
pub fn percent_off(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("-{value}%"))
}
