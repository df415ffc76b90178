//! Shortcut press counts and per-image record sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::patterns::MarkerPatterns;

/// Attribution used when a file has no session to take a user/date from.
pub const NOT_AVAILABLE: &str = "N/A";

/// Press count for one shortcut key in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutCount {
    pub user: String,
    pub date: String,
    pub shortcut: String,
    pub count: u32,
    pub log_file: String,
}

/// Distinct records processed under one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecordEntry {
    pub user: Option<String>,
    pub date: Option<String>,
    pub image: String,
    pub records: BTreeSet<String>,
    pub unique_records: usize,
    pub log_file: String,
}

/// Shortcut counts in first-pressed order.
#[derive(Debug, Default)]
pub struct ShortcutCounter {
    counts: Vec<(String, u32)>,
}

impl ShortcutCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, patterns: &MarkerPatterns, line: &str) {
        let Some(key) = patterns.shortcut(line) else {
            return;
        };
        match self.counts.iter_mut().find(|(name, _)| name == key) {
            Some((_, count)) => *count = count.saturating_add(1),
            None => self.counts.push((key.to_string(), 1)),
        }
    }

    /// Count for a single key, 0 if never pressed.
    pub fn count(&self, key: &str) -> u32 {
        self.counts
            .iter()
            .find(|(name, _)| name == key)
            .map_or(0, |(_, count)| *count)
    }

    /// Rows attributed to `user`/`date`, or `N/A` when unknown.
    pub fn finish(self, user: Option<&str>, date: Option<&str>, log_file: &str) -> Vec<ShortcutCount> {
        let user = user.unwrap_or(NOT_AVAILABLE);
        let date = date.unwrap_or(NOT_AVAILABLE);
        self.counts
            .into_iter()
            .map(|(shortcut, count)| ShortcutCount {
                user: user.to_string(),
                date: date.to_string(),
                shortcut,
                count,
                log_file: log_file.to_string(),
            })
            .collect()
    }
}

/// Records attributed to the most recently selected image.
#[derive(Debug, Default)]
pub struct ImageRecordTracker {
    current_image: Option<String>,
    images: Vec<(String, BTreeSet<String>)>,
}

impl ImageRecordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, patterns: &MarkerPatterns, line: &str) {
        if let Some(update) = patterns.image_update(line) {
            self.current_image = Some(update.record_id.to_string());
            return;
        }

        let Some(image) = self.current_image.as_deref() else {
            return;
        };
        let Some(record) = patterns.trailing_record(line) else {
            return;
        };

        let position = match self.images.iter().position(|(id, _)| id == image) {
            Some(position) => position,
            None => {
                self.images.push((image.to_string(), BTreeSet::new()));
                self.images.len() - 1
            }
        };
        self.images[position].1.insert(record.to_string());
    }

    pub fn finish(self, user: Option<&str>, date: Option<&str>, log_file: &str) -> Vec<ImageRecordEntry> {
        self.images
            .into_iter()
            .map(|(image, records)| ImageRecordEntry {
                user: user.map(String::from),
                date: date.map(String::from),
                image,
                unique_records: records.len(),
                records,
                log_file: log_file.to_string(),
            })
            .collect()
    }
}
