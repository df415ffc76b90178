//! Idle gaps between consecutive timestamped lines.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::patterns::LoginPattern;
use crate::timestamp::{extract_timestamp, format_hms, minutes};

/// Default minimum gap, in seconds.
pub const DEFAULT_MIN_GAP_SECS: i64 = 120;

/// An idle interval between two adjacent log lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGap {
    pub user: Option<String>,
    pub date: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// `HH:MM:SS`.
    pub duration: String,
    pub duration_minutes: f64,
    pub start_line: String,
    pub end_line: String,
    pub log_file: String,
}

/// Scan adjacent line pairs for gaps of at least `min_gap_secs`.
///
/// Only pairs where both lines carry a timestamp are compared, so a line
/// without one hides any gap across it.
pub fn find_time_gaps<S: AsRef<str>>(lines: &[S], log_file: &str, min_gap_secs: i64) -> Vec<TimeGap> {
    let login_pattern = LoginPattern::new();
    let mut user: Option<String> = None;
    let mut date: Option<String> = None;
    let mut gaps = Vec::new();

    for pair in lines.windows(2) {
        let (current, next) = (pair[0].as_ref(), pair[1].as_ref());

        if let Some(login) = login_pattern.parse(current) {
            user = Some(login.user);
            date = Some(login.date);
        }

        let (Some(start), start_line) = extract_timestamp(current) else {
            continue;
        };
        let (Some(end), end_line) = extract_timestamp(next) else {
            continue;
        };

        let seconds = (end - start).num_seconds();
        if seconds < min_gap_secs {
            continue;
        }

        gaps.push(TimeGap {
            user: user.clone(),
            date: date.clone(),
            start_time: start,
            end_time: end,
            duration: format_hms(seconds),
            duration_minutes: minutes(seconds),
            start_line: start_line.to_string(),
            end_line: end_line.to_string(),
            log_file: log_file.to_string(),
        });
    }

    tracing::debug!(log_file, gaps = gaps.len(), "gap scan complete");
    gaps
}
