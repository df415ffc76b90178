//! Timestamp extraction and duration formatting for log lines.
//!
//! Every log line of interest starts with `YYYY-MM-DD HH:MM:SS` followed by
//! `" - "`. Lines that don't are a normal occurrence (stack traces, wrapped
//! messages), so nothing here returns an error: callers get `None` and move on.

use chrono::NaiveDateTime;

/// Format of the leading timestamp on every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of a formatted timestamp (`2025-01-01 08:00:00`).
const TIMESTAMP_LEN: usize = 19;

/// Separator between the timestamp and the rest of the line.
const FIELD_DELIMITER: &str = " - ";

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

/// Extract the timestamp in front of the first `" - "` delimiter.
///
/// Returns the timestamp and the trimmed line on success. On failure the line
/// comes back untouched.
pub fn extract_timestamp(line: &str) -> (Option<NaiveDateTime>, &str) {
    let head = line.split(FIELD_DELIMITER).next().unwrap_or(line).trim();
    match parse_timestamp(head) {
        Some(ts) => (Some(ts), line.trim()),
        None => (None, line),
    }
}

/// Parse exactly the first 19 characters of a line as a timestamp.
///
/// Stricter than [`extract_timestamp`]: no trimming, no delimiter search.
pub fn leading_timestamp(line: &str) -> Option<NaiveDateTime> {
    line.get(..TIMESTAMP_LEN).and_then(parse_timestamp)
}

/// Formats whole seconds as `HH:MM:SS`. Hours are not wrapped at 24.
/// Negative durations are treated as zero.
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Inverse of [`format_hms`].
pub fn parse_hms(s: &str) -> Option<i64> {
    let mut parts = s.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let secs: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(0..60).contains(&minutes) || !(0..60).contains(&secs) {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + secs)
}

/// Time-of-day portion of a timestamp, `HH:MM:SS`.
pub fn format_clock(ts: NaiveDateTime) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole seconds as fractional minutes, rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
pub fn minutes(seconds: i64) -> f64 {
    round2(seconds as f64 / 60.0)
}
