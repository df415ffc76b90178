//! Per-user rollup of an aggregated [`LogReport`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::LogReport;
use crate::counters::{ImageRecordEntry, NOT_AVAILABLE, ShortcutCount};
use crate::ocr::OcrRow;
use crate::session::Session;
use crate::timestamp::{format_hms, round2};

/// Label of the all-users row.
pub const TOTAL_ROW_LABEL: &str = "Total (All Users)";

/// Totals for one user, or for everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    /// `<earliest> to <latest>` session date, or `N/A`.
    pub date_range: String,
    pub total_duration_secs: i64,
    /// `HH:MM:SS`.
    pub total_duration: String,
    pub ocr_attempts: u64,
    pub ocr_duration_secs: f64,
    pub ocr_duration: String,
    pub name_ocr_duration_secs: f64,
    pub name_ocr_duration: String,
    /// Distinct OCR image ids.
    pub images: usize,
    pub shortcuts: u64,
    pub character_count: u64,
    /// Distinct images in the image/record view.
    pub images_processed: usize,
    pub records_processed: usize,
    /// Sum of session update counts.
    pub field_edits: u64,
    /// Distinct log files contributing sessions.
    pub log_files: usize,
}

/// One row per session user (sorted by name) plus the all-users row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub users: Vec<UserSummary>,
    pub total: UserSummary,
}

#[allow(clippy::cast_possible_truncation)]
fn hms_from_secs(seconds: f64) -> String {
    format_hms(seconds as i64)
}

fn rollup(
    username: &str,
    sessions: &[&Session],
    ocr: &[&OcrRow],
    shortcuts: &[&ShortcutCount],
    image_records: &[&ImageRecordEntry],
) -> UserSummary {
    let dates: BTreeSet<&str> = sessions.iter().map(|s| s.date.as_str()).collect();
    let date_range = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => NOT_AVAILABLE.to_string(),
    };

    let total_duration_secs: i64 = sessions.iter().map(|s| s.duration_seconds).sum();
    let ocr_duration_secs: f64 = ocr.iter().map(|o| o.total_ocr_duration_secs).sum();
    let name_ocr_duration_secs: f64 = ocr
        .iter()
        .filter(|o| o.is_name_ocr)
        .map(|o| o.total_ocr_duration_secs)
        .sum();

    UserSummary {
        username: username.to_string(),
        date_range,
        total_duration_secs,
        total_duration: format_hms(total_duration_secs),
        ocr_attempts: ocr.iter().map(|o| u64::from(o.ocr_attempts)).sum(),
        ocr_duration_secs: round2(ocr_duration_secs),
        ocr_duration: hms_from_secs(ocr_duration_secs),
        name_ocr_duration_secs: round2(name_ocr_duration_secs),
        name_ocr_duration: hms_from_secs(name_ocr_duration_secs),
        images: ocr
            .iter()
            .map(|o| o.image_id.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        shortcuts: shortcuts.iter().map(|s| u64::from(s.count)).sum(),
        character_count: sessions.iter().map(|s| s.character_count).sum(),
        images_processed: image_records
            .iter()
            .map(|i| i.image.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        records_processed: image_records.iter().map(|i| i.unique_records).sum(),
        field_edits: sessions.iter().map(|s| u64::from(s.update_count)).sum(),
        log_files: sessions
            .iter()
            .map(|s| s.log_file.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
    }
}

/// Summarize a report by session user.
///
/// OCR and image-record rows are matched to users by their own attribution;
/// rows attributed to nobody only show up in the total.
pub fn summarize(report: &LogReport) -> Summary {
    let users: BTreeSet<&str> = report.sessions.iter().map(|s| s.user.as_str()).collect();

    let users = users
        .into_iter()
        .map(|user| {
            let sessions: Vec<_> = report.sessions.iter().filter(|s| s.user == user).collect();
            let ocr: Vec<_> = report
                .ocr
                .iter()
                .filter(|o| o.user.as_deref() == Some(user))
                .collect();
            let shortcuts: Vec<_> = report.shortcuts.iter().filter(|s| s.user == user).collect();
            let image_records: Vec<_> = report
                .image_records
                .iter()
                .filter(|i| i.user.as_deref() == Some(user))
                .collect();
            rollup(user, &sessions, &ocr, &shortcuts, &image_records)
        })
        .collect();

    let sessions: Vec<_> = report.sessions.iter().collect();
    let ocr: Vec<_> = report.ocr.iter().collect();
    let shortcuts: Vec<_> = report.shortcuts.iter().collect();
    let image_records: Vec<_> = report.image_records.iter().collect();
    let total = rollup(TOTAL_ROW_LABEL, &sessions, &ocr, &shortcuts, &image_records);

    Summary { users, total }
}
