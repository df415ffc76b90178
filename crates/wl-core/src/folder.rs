//! Folder-level aggregation over every log file in a directory.

use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisOptions, LogReport, analyze_file};
use crate::error::AnalysisError;

/// Aggregated records for a folder, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderReport {
    pub report: LogReport,
    /// Log files that were read and analyzed.
    pub files_analyzed: usize,
    /// Log files that could not be read; they contribute no records.
    pub files_skipped: Vec<PathBuf>,
}

fn has_log_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Log files directly inside `dir`, sorted by path.
pub fn list_log_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, AnalysisError> {
    let list_error = |source| AnalysisError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.is_file() && has_log_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Analyze every log file in `dir` and concatenate the results in file order.
///
/// A file that can't be read is logged and skipped; only failing to list the
/// directory itself is an error.
pub fn analyze_folder(dir: &Path, options: &AnalysisOptions) -> Result<FolderReport, AnalysisError> {
    let files = list_log_files(dir, &options.extensions)?;
    tracing::debug!(dir = ?dir, files = files.len(), "found log files");

    let mut folder = FolderReport::default();
    for path in files {
        match analyze_file(&path, options) {
            Ok(report) => {
                folder.report.extend(report);
                folder.files_analyzed += 1;
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "skipping unreadable log file");
                folder.files_skipped.push(path);
            }
        }
    }

    tracing::debug!(
        files = folder.files_analyzed,
        skipped = folder.files_skipped.len(),
        sessions = folder.report.sessions.len(),
        ocr_rows = folder.report.ocr.len(),
        shortcuts = folder.report.shortcuts.len(),
        gaps = folder.report.time_gaps.len(),
        "folder analysis complete"
    );
    Ok(folder)
}
