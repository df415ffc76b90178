//! Per-file analysis: the activity pass and the gap pass.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::counters::{ImageRecordEntry, ImageRecordTracker, ShortcutCount, ShortcutCounter};
use crate::error::AnalysisError;
use crate::gaps::{DEFAULT_MIN_GAP_SECS, TimeGap, find_time_gaps};
use crate::ocr::{OcrRow, OcrTracker};
use crate::patterns::MarkerPatterns;
use crate::session::{Session, SessionReconstructor};

/// Buffer size for `BufReader` (64KB, log files run to tens of MB)
const BUFFER_SIZE: usize = 64 * 1024;

/// Knobs for file and folder analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// File extensions treated as logs, without the dot. Case-insensitive.
    pub extensions: Vec<String>,
    /// Minimum idle interval reported as a gap.
    pub min_gap_secs: i64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["log".to_string()],
            min_gap_secs: DEFAULT_MIN_GAP_SECS,
        }
    }
}

/// Records from the activity pass (everything except gaps).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub sessions: Vec<Session>,
    pub ocr: Vec<OcrRow>,
    pub shortcuts: Vec<ShortcutCount>,
    pub image_records: Vec<ImageRecordEntry>,
}

/// The five record collections for one file or a whole folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogReport {
    pub sessions: Vec<Session>,
    pub ocr: Vec<OcrRow>,
    pub shortcuts: Vec<ShortcutCount>,
    pub image_records: Vec<ImageRecordEntry>,
    pub time_gaps: Vec<TimeGap>,
}

impl LogReport {
    pub fn new(activity: Activity, time_gaps: Vec<TimeGap>) -> Self {
        Self {
            sessions: activity.sessions,
            ocr: activity.ocr,
            shortcuts: activity.shortcuts,
            image_records: activity.image_records,
            time_gaps,
        }
    }

    /// Append another report's records after this one's.
    pub fn extend(&mut self, other: Self) {
        self.sessions.extend(other.sessions);
        self.ocr.extend(other.ocr);
        self.shortcuts.extend(other.shortcuts);
        self.image_records.extend(other.image_records);
        self.time_gaps.extend(other.time_gaps);
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
            && self.ocr.is_empty()
            && self.shortcuts.is_empty()
            && self.image_records.is_empty()
            && self.time_gaps.is_empty()
    }
}

/// Single pass over a file's lines: sessions, OCR timing and counters.
#[allow(clippy::cast_precision_loss)]
pub fn analyze_activity<S: AsRef<str>>(lines: &[S], log_file: &str) -> Activity {
    let patterns = MarkerPatterns::new();
    let mut sessions = SessionReconstructor::new(log_file);
    let mut ocr = OcrTracker::new();
    let mut shortcuts = ShortcutCounter::new();
    let mut image_records = ImageRecordTracker::new();

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        sessions.observe(&patterns, lines, index);
        ocr.observe(
            &patterns,
            line,
            sessions.current_user(),
            sessions.current_date(),
        );
        shortcuts.observe(&patterns, line);
        image_records.observe(&patterns, line);
    }

    // Image records are attributed to whoever was logged in last
    let image_records = image_records.finish(
        sessions.current_user(),
        sessions.current_date(),
        log_file,
    );
    let mut sessions = sessions.finish(lines);
    let ocr = ocr.finish(log_file);

    // Shortcuts belong to the file's first session
    let first = sessions.first();
    let shortcuts = shortcuts.finish(
        first.map(|s| s.user.as_str()),
        first.map(|s| s.date.as_str()),
        log_file,
    );

    for session in &mut sessions {
        session.total_ocr_duration_secs = ocr.total_duration_secs as f64;
        session.total_name_ocr_duration_secs = ocr.total_name_duration_secs as f64;
    }

    Activity {
        sessions,
        ocr: ocr.rows,
        shortcuts,
        image_records,
    }
}

/// Read a whole log file into lines.
///
/// The handle is closed before this returns, whether or not reading succeeded.
/// Trailing `\r` is stripped so CRLF logs behave like LF logs.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>, AnalysisError> {
    let read_error = |source| AnalysisError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let reader = BufReader::with_capacity(BUFFER_SIZE, file);

    reader
        .lines()
        .map(|line| {
            line.map(|mut line| {
                if line.ends_with('\r') {
                    line.pop();
                }
                line
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)
}

/// File name used to tag every record from `path`.
pub fn log_file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Analyze one log file: the activity pass, then an independent gap pass.
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<LogReport, AnalysisError> {
    let lines = read_log_lines(path)?;
    let log_file = log_file_name(path);
    tracing::debug!(path = ?path, lines = lines.len(), "analyzing log file");

    let activity = analyze_activity(&lines, &log_file);
    let time_gaps = find_time_gaps(&lines, &log_file, options.min_gap_secs);

    tracing::debug!(
        log_file,
        sessions = activity.sessions.len(),
        ocr_rows = activity.ocr.len(),
        gaps = time_gaps.len(),
        "analyzed log file"
    );

    Ok(LogReport::new(activity, time_gaps))
}
