//! OCR timing, tracked alongside sessions over the same lines.
//!
//! An OCR operation starts when handwriting-recognition mode is switched on
//! and ends with the next debug-level clipboard copy. Its duration is
//! attributed to the image most recently selected by an `IMAGE_NUMBER`
//! update. Clipboard payloads of two or more words are taken to be extracted
//! names and reported individually.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::patterns::{MarkerPatterns, is_name_like};
use crate::timestamp::round2;

/// An OCR operation whose clipboard text passed [`is_name_like`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOcr {
    pub duration_secs: i64,
    pub text: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Accumulated OCR activity for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrTarget {
    pub image_id: String,
    pub image_number: String,
    pub user: Option<String>,
    pub date: Option<String>,
    pub clipboard_count: u32,
    pub name_clipboard_count: u32,
    pub durations: Vec<i64>,
    pub name_entries: Vec<NameOcr>,
}

impl OcrTarget {
    fn new(image_id: &str, image_number: String, user: Option<&str>, date: Option<&str>) -> Self {
        Self {
            image_id: image_id.to_string(),
            image_number,
            user: user.map(String::from),
            date: date.map(String::from),
            clipboard_count: 0,
            name_clipboard_count: 0,
            durations: Vec::new(),
            name_entries: Vec::new(),
        }
    }

    fn total_duration(&self) -> i64 {
        self.durations.iter().sum()
    }

    fn name_duration(&self) -> i64 {
        self.name_entries.iter().map(|e| e.duration_secs).sum()
    }

    /// Output rows: one per name entry, or a single summary row.
    #[allow(clippy::cast_precision_loss)]
    fn rows(&self, log_file: &str) -> Vec<OcrRow> {
        if self.name_entries.is_empty() {
            let total = self.total_duration() as f64;
            let average = if self.durations.is_empty() {
                0.0
            } else {
                total / self.durations.len() as f64
            };
            return vec![OcrRow {
                ocr_duration_secs: round2(average),
                total_ocr_duration_secs: round2(total),
                start_time: None,
                end_time: None,
                extracted_text: None,
                is_name_ocr: false,
                ..self.row_base(log_file)
            }];
        }

        self.name_entries
            .iter()
            .map(|entry| {
                let duration = round2(entry.duration_secs as f64);
                OcrRow {
                    ocr_duration_secs: duration,
                    total_ocr_duration_secs: duration,
                    start_time: Some(entry.start),
                    end_time: Some(entry.end),
                    extracted_text: Some(entry.text.clone()),
                    is_name_ocr: true,
                    ..self.row_base(log_file)
                }
            })
            .collect()
    }

    fn row_base(&self, log_file: &str) -> OcrRow {
        OcrRow {
            user: self.user.clone(),
            date: self.date.clone(),
            image_id: self.image_id.clone(),
            image_number: self.image_number.clone(),
            ocr_attempts: self.clipboard_count,
            name_clipboard_count: self.name_clipboard_count,
            ocr_duration_secs: 0.0,
            total_ocr_duration_secs: 0.0,
            start_time: None,
            end_time: None,
            extracted_text: None,
            is_name_ocr: false,
            log_file: log_file.to_string(),
        }
    }
}

/// One reported OCR row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRow {
    pub user: Option<String>,
    pub date: Option<String>,
    pub image_id: String,
    pub image_number: String,
    /// Clipboard copies seen while this image was the OCR target.
    pub ocr_attempts: u32,
    pub name_clipboard_count: u32,
    /// Name rows: this operation's duration. Summary rows: the average.
    pub ocr_duration_secs: f64,
    /// Name rows: this operation's duration. Summary rows: the sum.
    pub total_ocr_duration_secs: f64,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub extracted_text: Option<String>,
    pub is_name_ocr: bool,
    pub log_file: String,
}

/// OCR rows for a file plus file-wide duration totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrSummary {
    pub rows: Vec<OcrRow>,
    /// Sum of every OCR duration in the file, in seconds.
    pub total_duration_secs: i64,
    /// Sum of name OCR durations in the file, in seconds.
    pub total_name_duration_secs: i64,
}

/// OCR state machine for one file.
#[derive(Debug, Default)]
pub struct OcrTracker {
    in_progress: bool,
    started_at: Option<NaiveDateTime>,
    current_image: Option<String>,
    targets: Vec<OcrTarget>,
    index: HashMap<String, usize>,
}

impl OcrTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. `user`/`date` seed targets seen for the first time.
    pub fn observe(
        &mut self,
        patterns: &MarkerPatterns,
        line: &str,
        user: Option<&str>,
        date: Option<&str>,
    ) {
        if let Some(start) = patterns.ocr_start(line) {
            if !self.in_progress {
                self.started_at = Some(start);
                self.in_progress = true;
                tracing::trace!(%start, "OCR started");
            }
        }

        if let Some(end) = patterns.ocr_end(line) {
            self.finish_operation(end.at, end.text);
        }

        if let Some(image) = patterns.ocr_image(line) {
            self.current_image = Some(image.image_id.to_string());
            if !self.index.contains_key(image.image_id) {
                let image_number = format!("{}_{}", image.image_num, image.seq);
                self.index
                    .insert(image.image_id.to_string(), self.targets.len());
                self.targets
                    .push(OcrTarget::new(image.image_id, image_number, user, date));
            }
        }

        if let Some(text) = patterns.clipboard(line) {
            if let Some(target) = self.current_target_mut() {
                target.clipboard_count = target.clipboard_count.saturating_add(1);
                if is_name_like(text) {
                    target.name_clipboard_count = target.name_clipboard_count.saturating_add(1);
                }
            }
        }
    }

    fn finish_operation(&mut self, end: NaiveDateTime, text: &str) {
        if !self.in_progress {
            return;
        }
        let Some(start) = self.started_at else {
            return;
        };
        let Some(target) = self.current_target_mut() else {
            return;
        };

        let duration_secs = (end - start).num_seconds();
        target.durations.push(duration_secs);
        if is_name_like(text) {
            target.name_entries.push(NameOcr {
                duration_secs,
                text: text.to_string(),
                start,
                end,
            });
        }
        tracing::trace!(duration_secs, "OCR finished");

        self.in_progress = false;
        self.started_at = None;
    }

    fn current_target_mut(&mut self) -> Option<&mut OcrTarget> {
        let position = *self.index.get(self.current_image.as_deref()?)?;
        self.targets.get_mut(position)
    }

    /// Targets in first-seen order.
    pub fn targets(&self) -> &[OcrTarget] {
        &self.targets
    }

    /// Expand every target into output rows and compute the file totals.
    pub fn finish(self, log_file: &str) -> OcrSummary {
        let total_duration_secs = self.targets.iter().map(OcrTarget::total_duration).sum();
        let total_name_duration_secs = self.targets.iter().map(OcrTarget::name_duration).sum();
        let rows = self
            .targets
            .iter()
            .flat_map(|target| target.rows(log_file))
            .collect();

        OcrSummary {
            rows,
            total_duration_secs,
            total_name_duration_secs,
        }
    }
}
