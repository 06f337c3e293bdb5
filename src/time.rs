use crate::error::{BoardError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout used in query strings
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a timestamp for a query string, dropping sub-second precision
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp as echoed by the API.
///
/// The API sends RFC 3339 with milliseconds (`2024-03-09T07:05:00.000Z`);
/// a bare `YYYY-MM-DDTHH:MM:SS` is read as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| BoardError::MalformedResponse(format!("invalid timestamp {s:?}: {e}")))
}
