//! Core log analysis for the work log analyzer.
//!
//! This crate turns raw application log lines into:
//! - Sessions: one per login marker, with edit and record counters
//! - OCR timing: handwriting-recognition operations attributed to images
//! - Counters: shortcut presses and records processed per image
//! - Time gaps: idle intervals between adjacent timestamped lines
//!
//! Each file is analyzed independently; [`analyze_folder`] concatenates the
//! per-file results and [`summarize`] rolls them up per user.

pub mod analysis;
pub mod counters;
mod error;
pub mod folder;
pub mod gaps;
pub mod ocr;
pub mod patterns;
pub mod session;
pub mod summary;
pub mod timestamp;

pub use analysis::{Activity, AnalysisOptions, LogReport, analyze_activity, analyze_file};
pub use counters::{ImageRecordEntry, ShortcutCount};
pub use error::AnalysisError;
pub use folder::{FolderReport, analyze_folder};
pub use gaps::{TimeGap, find_time_gaps};
pub use ocr::OcrRow;
pub use session::{ImageSection, Session};
pub use summary::{Summary, UserSummary, summarize};
