//! File command: a single log file.

use std::path::Path;

use anyhow::{Context, Result};
use wl_core::analysis::log_file_name;
use wl_core::{AnalysisOptions, FolderReport, analyze_file};

use super::report::{self, ReportData};

/// Runs the file command.
pub fn run(path: &Path, options: &AnalysisOptions, json: bool) -> Result<()> {
    let report = analyze_file(path, options)
        .with_context(|| format!("failed to analyze log file {}", path.display()))?;

    let folder = FolderReport {
        report,
        files_analyzed: 1,
        files_skipped: Vec::new(),
    };
    let data = ReportData::new(log_file_name(path), folder);
    report::print(&data, json)
}
