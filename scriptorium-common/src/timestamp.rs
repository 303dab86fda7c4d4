//! Timestamp parsing and display
//!
//! The backend emits ISO 8601 strings, sometimes with an offset and
//! sometimes naive. Naive values are treated as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Display format used on every dashboard page
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a backend timestamp string.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`, `2024-05-01T12:00:00+02:00`)
/// and naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` (also with a space separator).
///
/// # Examples
///
/// ```
/// use scriptorium_common::timestamp::parse_timestamp;
///
/// assert!(parse_timestamp("2024-05-01T12:00:00Z").is_some());
/// assert!(parse_timestamp("2024-05-01T12:00:00.123456").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render an optional backend timestamp for display.
///
/// Absent or unparseable values render as `fallback`.
pub fn format_timestamp(raw: Option<&str>, fallback: &str) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| fallback.to_string())
}
