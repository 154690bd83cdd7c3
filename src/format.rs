use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

lazy_static! {
    static ref TIMESTAMP_PATTERN: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
}

/// Applies type-specific rendering to a raw cell value.
///
/// Currently the only rule is date reformatting: values shaped like
/// `YYYY-MM-DD HH:MM:SS` are re-rendered as `DD-MM-YYYY`. A value that
/// matches the shape but is not a valid calendar timestamp is returned
/// unchanged rather than failing the merge. Everything else passes through.
///
/// This is the single extension point for future type-aware rendering;
/// new rules belong here, not in the merge passes.
pub fn format_value(value: &str) -> String {
    if TIMESTAMP_PATTERN.is_match(value) {
        match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            Ok(dt) => return dt.format("%d-%m-%Y").to_string(),
            Err(e) => {
                warn!("Failed to convert date '{}': {}", value, e);
                return value.to_string();
            }
        }
    }
    value.to_string()
}
