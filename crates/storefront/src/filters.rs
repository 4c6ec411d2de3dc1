//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Upper-cases the first character of a label.
///
/// Usage in templates: `{{ category|capitalize_first }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn capitalize_first(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(shopfront_core::text::capitalize_first(&value.to_string()))
}
