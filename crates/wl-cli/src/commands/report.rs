//! Report rendering shared by `wl analyze` and `wl file`.
//!
//! Renders the five record collections and the per-user summary either as a
//! human-readable text report or as a single JSON document.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use wl_core::counters::NOT_AVAILABLE;
use wl_core::timestamp::{format_clock, format_hms};
use wl_core::{FolderReport, LogReport, Summary, UserSummary, summarize};

/// Placeholder for a session end time that couldn't be determined.
const NO_END_TIME: &str = "--:--:--";

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    /// Directory or file name the report covers.
    pub source: String,
    pub files_analyzed: usize,
    pub files_skipped: Vec<PathBuf>,
    pub report: LogReport,
    pub summary: Summary,
}

impl ReportData {
    pub fn new(source: impl Into<String>, folder: FolderReport) -> Self {
        let summary = summarize(&folder.report);
        Self {
            source: source.into(),
            files_analyzed: folder.files_analyzed,
            files_skipped: folder.files_skipped,
            report: folder.report,
            summary,
        }
    }
}

// ========== Text Output ==========

fn heading(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

fn format_summary_row(output: &mut String, row: &UserSummary) {
    writeln!(output, "{}: {}", row.username, row.date_range).unwrap();
    writeln!(output, "  Time worked:  {}", row.total_duration).unwrap();
    writeln!(
        output,
        "  Field edits:  {} ({} characters)",
        row.field_edits, row.character_count
    )
    .unwrap();
    writeln!(
        output,
        "  OCR:          {} attempts on {} images, {} (names {})",
        row.ocr_attempts, row.images, row.ocr_duration, row.name_ocr_duration
    )
    .unwrap();
    writeln!(
        output,
        "  Records:      {} across {} images",
        row.records_processed, row.images_processed
    )
    .unwrap();
    writeln!(output, "  Shortcuts:    {}", row.shortcuts).unwrap();
    writeln!(output, "  Log files:    {}", row.log_files).unwrap();
}

fn format_sections(output: &mut String, report: &LogReport) {
    heading(output, "SESSIONS");
    if report.sessions.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for session in &report.sessions {
        let end = session
            .end_time
            .map_or_else(|| NO_END_TIME.to_string(), format_clock);
        writeln!(
            output,
            "  {}  {}  {}-{end}  {}  {} updates  [{}]",
            session.user,
            session.date,
            format_clock(session.start_time),
            format_hms(session.duration_seconds),
            session.update_count,
            session.log_file
        )
        .unwrap();
    }

    heading(output, "OCR");
    if report.ocr.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for row in &report.ocr {
        let text = row
            .extracted_text
            .as_deref()
            .map(|t| format!("  \"{t}\""))
            .unwrap_or_default();
        writeln!(
            output,
            "  {} ({})  {}  {} attempts  {:.2}s{text}  [{}]",
            row.image_id,
            row.image_number,
            or_na(row.user.as_deref()),
            row.ocr_attempts,
            row.total_ocr_duration_secs,
            row.log_file
        )
        .unwrap();
    }

    heading(output, "SHORTCUTS");
    if report.shortcuts.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for shortcut in &report.shortcuts {
        writeln!(
            output,
            "  {}  x{}  {}  [{}]",
            shortcut.shortcut, shortcut.count, shortcut.user, shortcut.log_file
        )
        .unwrap();
    }

    heading(output, "IMAGE RECORDS");
    if report.image_records.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for entry in &report.image_records {
        writeln!(
            output,
            "  {}  {} records  {}  [{}]",
            entry.image,
            entry.unique_records,
            or_na(entry.user.as_deref()),
            entry.log_file
        )
        .unwrap();
    }

    heading(output, "TIME GAPS");
    if report.time_gaps.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for gap in &report.time_gaps {
        writeln!(
            output,
            "  {}-{}  {}  {}  [{}]",
            format_clock(gap.start_time),
            format_clock(gap.end_time),
            gap.duration,
            or_na(gap.user.as_deref()),
            gap.log_file
        )
        .unwrap();
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "WORK LOG REPORT: {}", data.source).unwrap();
    if data.files_skipped.is_empty() {
        writeln!(output, "Files analyzed: {}", data.files_analyzed).unwrap();
    } else {
        writeln!(
            output,
            "Files analyzed: {} ({} skipped)",
            data.files_analyzed,
            data.files_skipped.len()
        )
        .unwrap();
    }

    if data.report.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No activity found.").unwrap();
        return output;
    }

    heading(&mut output, "SUMMARY");
    let rows = data
        .summary
        .users
        .iter()
        .chain(std::iter::once(&data.summary.total));
    for (i, row) in rows.enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        format_summary_row(&mut output, row);
    }

    format_sections(&mut output, &data.report);
    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub source: &'a str,
    pub files_analyzed: usize,
    pub files_skipped: Vec<String>,
    pub summary: &'a Summary,
    #[serde(flatten)]
    pub records: &'a LogReport,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        source: &data.source,
        files_analyzed: data.files_analyzed,
        files_skipped: data
            .files_skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        summary: &data.summary,
        records: &data.report,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Prints a report to stdout.
pub fn print(data: &ReportData, json: bool) -> Result<()> {
    if json {
        let output = format_report_json(data)?;
        println!("{output}");
    } else {
        let output = format_report(data);
        print!("{output}");
    }

    Ok(())
}
