//! Analyze command: every log file in a directory.

use std::path::Path;

use anyhow::{Context, Result};
use wl_core::{AnalysisOptions, analyze_folder};

use super::report::{self, ReportData};

/// Runs the analyze command.
pub fn run(dir: &Path, options: &AnalysisOptions, json: bool) -> Result<()> {
    let folder = analyze_folder(dir, options)
        .with_context(|| format!("failed to analyze log directory {}", dir.display()))?;

    for path in &folder.files_skipped {
        eprintln!("Skipped unreadable file: {}", path.display());
    }

    if !json && folder.files_analyzed == 0 && folder.files_skipped.is_empty() {
        println!(
            "No log files found in {} (extensions: {}).",
            dir.display(),
            options.extensions.join(", ")
        );
        return Ok(());
    }

    let data = ReportData::new(dir.display().to_string(), folder);
    report::print(&data, json)
}
