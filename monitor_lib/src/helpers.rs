//! Timestamp helpers for API payloads.

use chrono::{DateTime, Local, Utc};

/// Format time as ISO 8601 for the API.
pub fn format_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 time string as produced by the monitoring server
/// (with or without a trailing `Z`).
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim().trim_end_matches('Z').trim_end_matches('z');
    let parsed = chrono::DateTime::parse_from_rfc3339(&format!("{}Z", s))
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(s))
        .map_err(|e| e.to_string())?;
    Ok(parsed.with_timezone(&Utc))
}

/// Format an ISO 8601 timestamp for display. If `use_utc` is true, shows UTC;
/// otherwise converts to local timezone. On parse failure returns the
/// original string unchanged.
pub fn format_timestamp_display(ts: &str, use_utc: bool) -> String {
    let dt = match parse_time(ts) {
        Ok(d) => d,
        _ => return ts.to_string(),
    };
    if use_utc {
        dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        dt.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}
