//! Work session reconstruction from login markers.
//!
//! A session opens on every login marker and stays open until the next login
//! or the end of the file. While open it accumulates edit, record and update
//! counters from the lines it sees. Closing consumes the [`OpenSession`] and
//! yields an immutable [`Session`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::patterns::{LOGIN_MARKER, Login, MarkerPatterns, is_update};
use crate::timestamp::{leading_timestamp, minutes};

/// Per-record image summary within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSection {
    /// Image number from the `IMAGE_NUMBER` update (`<num>` of `<num>_<seq>`).
    pub image_num: String,
    /// Highest `r_num` seen for the record since its image was assigned.
    pub records_processed: u64,
}

/// A closed work session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub date: String,
    pub start_time: NaiveDateTime,
    /// Unset when the boundary scan found no timestamp.
    pub end_time: Option<NaiveDateTime>,
    pub duration_seconds: i64,
    /// Duration in minutes, rounded to two decimals.
    pub duration_minutes: f64,
    /// Record ids touched by `IMAGE_NUMBER` updates.
    pub records: BTreeSet<String>,
    /// Record id to the `r_num` values observed for it.
    pub record_sequences: BTreeMap<String, BTreeSet<u64>>,
    /// Column name to number of edits.
    pub column_edits: BTreeMap<String, u32>,
    /// Total characters across edited values.
    pub character_count: u64,
    /// Lines carrying the `UPDATED` token.
    pub update_count: u32,
    pub image_sections: BTreeMap<String, ImageSection>,
    pub images_processed_count: u32,
    /// Sum over records of the highest `r_num` seen for each.
    pub total_record_count: u64,
    /// File-wide OCR totals, identical on every session of a file.
    #[serde(default)]
    pub total_ocr_duration_secs: f64,
    #[serde(default)]
    pub total_name_ocr_duration_secs: f64,
    pub log_file: String,
}

impl Session {
    /// Number of distinct records touched (the "Total Images" column).
    pub fn total_images(&self) -> usize {
        self.records.len()
    }
}

/// Accumulator for the session currently in progress.
#[derive(Debug, Clone)]
pub struct OpenSession {
    user: String,
    date: String,
    start_time: NaiveDateTime,
    records: BTreeSet<String>,
    record_sequences: BTreeMap<String, BTreeSet<u64>>,
    column_edits: BTreeMap<String, u32>,
    character_count: u64,
    update_count: u32,
    image_sections: BTreeMap<String, ImageSection>,
    /// Set only by a `DOC_TYPE` batch update.
    images_processed: Option<u32>,
}

impl OpenSession {
    fn new(login: &Login) -> Self {
        Self {
            user: login.user.clone(),
            date: login.date.clone(),
            start_time: login.at,
            records: BTreeSet::new(),
            record_sequences: BTreeMap::new(),
            column_edits: BTreeMap::new(),
            character_count: 0,
            update_count: 0,
            image_sections: BTreeMap::new(),
            images_processed: None,
        }
    }

    /// Apply the per-line update rules. Several may fire on one line.
    fn apply(&mut self, patterns: &MarkerPatterns, line: &str) {
        if let Some(update) = patterns.image_update(line) {
            let record_id = update.record_id.to_string();
            self.records.insert(record_id.clone());
            self.record_sequences.entry(record_id.clone()).or_default();
            self.image_sections.insert(
                record_id,
                ImageSection {
                    image_num: update.image_num.to_string(),
                    records_processed: 0,
                },
            );
        }

        if let Some(count) = patterns.doc_type_update(line) {
            self.images_processed = Some(count);
        }

        if let Some(update) = patterns.sequence_update(line) {
            self.record_sequences
                .entry(update.record_id.to_string())
                .or_default()
                .insert(update.seq);
            if let Some(section) = self.image_sections.get_mut(update.record_id) {
                section.records_processed = section.records_processed.max(update.seq);
            }
        }

        if let Some(edit) = patterns.field_edit(line) {
            let chars = u64::try_from(edit.value.chars().count()).unwrap_or(u64::MAX);
            self.character_count = self.character_count.saturating_add(chars);
            let count = self.column_edits.entry(edit.column.to_string()).or_insert(0);
            *count = count.saturating_add(1);
        }

        if is_update(line) {
            self.update_count = self.update_count.saturating_add(1);
        }
    }

    /// Close the session at `end_time` and derive its totals.
    pub fn close(self, end_time: Option<NaiveDateTime>, log_file: &str) -> Session {
        let duration_seconds = end_time.map_or(0, |end| (end - self.start_time).num_seconds());

        let total_record_count = self
            .record_sequences
            .values()
            .map(|seqs| seqs.last().copied().unwrap_or(0))
            .fold(0u64, u64::saturating_add);

        let images_processed_count = self.images_processed.unwrap_or_else(|| {
            let with_sequences = self
                .record_sequences
                .values()
                .filter(|seqs| !seqs.is_empty())
                .count();
            u32::try_from(with_sequences).unwrap_or(u32::MAX)
        });

        Session {
            user: self.user,
            date: self.date,
            start_time: self.start_time,
            end_time,
            duration_seconds,
            duration_minutes: minutes(duration_seconds),
            records: self.records,
            record_sequences: self.record_sequences,
            column_edits: self.column_edits,
            character_count: self.character_count,
            update_count: self.update_count,
            image_sections: self.image_sections,
            images_processed_count,
            total_record_count,
            total_ocr_duration_secs: 0.0,
            total_name_ocr_duration_secs: 0.0,
            log_file: log_file.to_string(),
        }
    }
}

/// End time for a session closed right after `preceding`.
///
/// Walks backward over `preceding`, ignoring login lines and lines without a
/// leading timestamp, and returns the second timestamp found. Falls back to
/// the first when only one exists.
pub fn boundary_end_time<S: AsRef<str>>(preceding: &[S]) -> Option<NaiveDateTime> {
    let mut timestamps = preceding
        .iter()
        .rev()
        .map(AsRef::as_ref)
        .filter(|line| !line.contains(LOGIN_MARKER))
        .filter_map(leading_timestamp);

    let last = timestamps.next()?;
    Some(timestamps.next().unwrap_or(last))
}

/// Line-by-line session state machine for one file.
#[derive(Debug)]
pub struct SessionReconstructor {
    log_file: String,
    current: Option<OpenSession>,
    user: Option<String>,
    date: Option<String>,
    sessions: Vec<Session>,
}

impl SessionReconstructor {
    pub fn new(log_file: impl Into<String>) -> Self {
        Self {
            log_file: log_file.into(),
            current: None,
            user: None,
            date: None,
            sessions: Vec::new(),
        }
    }

    /// User from the most recent login marker.
    pub fn current_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Date from the most recent login marker.
    pub fn current_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Feed `lines[index]`. Earlier lines are needed for the boundary scan.
    pub fn observe<S: AsRef<str>>(&mut self, patterns: &MarkerPatterns, lines: &[S], index: usize) {
        let Some(line) = lines.get(index).map(AsRef::as_ref) else {
            return;
        };

        if let Some(login) = patterns.login.parse(line) {
            tracing::trace!(index, user = %login.user, "login marker");
            self.user = Some(login.user.clone());
            self.date = Some(login.date.clone());

            if let Some(open) = self.current.take() {
                self.close(open, boundary_end_time(&lines[..index]));
            }
            self.current = Some(OpenSession::new(&login));
        }

        if let Some(open) = self.current.as_mut() {
            open.apply(patterns, line);
        }
    }

    /// Close any open session against the end of the file and return all sessions.
    pub fn finish<S: AsRef<str>>(mut self, lines: &[S]) -> Vec<Session> {
        if let Some(open) = self.current.take() {
            self.close(open, boundary_end_time(lines));
        }
        self.sessions
    }

    fn close(&mut self, open: OpenSession, end_time: Option<NaiveDateTime>) {
        let session = open.close(end_time, &self.log_file);
        tracing::debug!(
            user = %session.user,
            start = %session.start_time,
            end = ?session.end_time,
            updates = session.update_count,
            "closed session"
        );
        self.sessions.push(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn login(time: &str, user: &str) -> String {
        format!(
            "2025-01-01 {time} - config - INFO - Logging initialized for user: {user} on 2025-01-01"
        )
    }

    fn reconstruct<S: AsRef<str>>(lines: &[S]) -> Vec<Session> {
        let patterns = MarkerPatterns::new();
        let mut reconstructor = SessionReconstructor::new("3516_2025-01-01.log");
        for index in 0..lines.len() {
            reconstructor.observe(&patterns, lines, index);
        }
        reconstructor.finish(lines)
    }

    #[test]
    fn test_boundary_uses_second_to_last_timestamp() {
        let lines = [
            "2025-01-01 08:01:00 - db - INFO - a",
            "2025-01-01 08:02:00 - db - INFO - b",
            "2025-01-01 08:03:00 - db - INFO - c",
        ];
        assert_eq!(boundary_end_time(&lines), Some(ts(8, 2, 0)));
    }

    #[test]
    fn test_boundary_single_timestamp() {
        let lines = ["2025-01-01 08:01:00 - db - INFO - a", "no timestamp here"];
        assert_eq!(boundary_end_time(&lines), Some(ts(8, 1, 0)));
    }

    #[test]
    fn test_boundary_no_timestamps() {
        let lines = ["continuation", "another continuation"];
        assert_eq!(boundary_end_time(&lines), None);
        assert_eq!(boundary_end_time::<&str>(&[]), None);
    }

    #[test]
    fn test_boundary_skips_logins_and_malformed_lines() {
        let lines = [
            "2025-01-01 08:01:00 - db - INFO - a".to_string(),
            "2025-01-01 08:02:00 - db - INFO - b".to_string(),
            "    at frame 3".to_string(),
            login("08:04:00", "alice"),
            "2025-01-01 08:05:00 - db - INFO - trailer".to_string(),
        ];
        assert_eq!(boundary_end_time(&lines), Some(ts(8, 2, 0)));
    }

    #[test]
    fn test_boundary_counts_repeated_timestamps_separately() {
        let lines = [
            "2025-01-01 08:01:00 - db - INFO - a",
            "2025-01-01 08:02:00 - db - INFO - b",
            "2025-01-01 08:02:00 - db - INFO - c",
        ];
        assert_eq!(boundary_end_time(&lines), Some(ts(8, 2, 0)));
    }

    #[test]
    fn test_login_closes_previous_session() {
        let lines = vec![
            login("08:00:00", "alice"),
            "2025-01-01 08:05:00 - db - INFO - UPDATED NAME from '' TO Jo of 1001".to_string(),
            login("08:10:00", "bob"),
        ];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions.len(), 2);
        let alice = &sessions[0];
        assert_eq!(alice.user, "alice");
        assert_eq!(alice.start_time, ts(8, 0, 0));
        // Only one non-login timestamp before bob's login
        assert_eq!(alice.end_time, Some(ts(8, 5, 0)));
        assert_eq!(alice.duration_seconds, 300);
        assert!((alice.duration_minutes - 5.0).abs() < f64::EPSILON);
        assert_eq!(alice.update_count, 1);

        let bob = &sessions[1];
        assert_eq!(bob.user, "bob");
        assert_eq!(bob.start_time, ts(8, 10, 0));
        assert_eq!(bob.update_count, 0);
    }

    #[test]
    fn test_last_session_closes_at_end_of_file() {
        let lines = vec![
            login("09:00:00", "alice"),
            "2025-01-01 09:10:00 - db - INFO - work".to_string(),
            "2025-01-01 09:20:00 - db - INFO - work".to_string(),
            "2025-01-01 09:30:00 - db - INFO - shutdown".to_string(),
        ];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].end_time, Some(ts(9, 20, 0)));
        assert_eq!(sessions[0].duration_seconds, 1200);
        assert_eq!(sessions[0].log_file, "3516_2025-01-01.log");
    }

    #[test]
    fn test_session_without_timestamps_has_no_end() {
        let lines = vec![login("09:00:00", "alice"), "no timestamp".to_string()];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions[0].end_time, None);
        assert_eq!(sessions[0].duration_seconds, 0);
        assert!(sessions[0].duration_minutes.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lines_before_first_login_are_ignored() {
        let lines = vec![
            "2025-01-01 07:00:00 - db - INFO - UPDATED NAME x TO y of 1".to_string(),
            login("08:00:00", "alice"),
        ];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].update_count, 0);
        assert!(sessions[0].column_edits.is_empty());
        // Boundary scan still reaches the earlier line
        assert_eq!(sessions[0].end_time, Some(ts(7, 0, 0)));
    }

    #[test]
    fn test_no_login_means_no_sessions() {
        let lines = ["2025-01-01 08:00:00 - db - INFO - UPDATED NAME x TO y of 1"];
        assert!(reconstruct(&lines).is_empty());
    }

    #[test]
    fn test_record_counters() {
        let lines = vec![
            login("08:00:00", "alice"),
            "2025-01-01 08:01:00 - db - INFO - Updated IMAGE_NUMBER to 500_002 for all records of 1001".to_string(),
            "2025-01-01 08:02:00 - db - INFO - UPDATED r_num    TO 1 of 1001".to_string(),
            "2025-01-01 08:03:00 - db - INFO - UPDATED r_num    TO 3 of 1001".to_string(),
            "2025-01-01 08:04:00 - db - INFO - UPDATED r_num    TO 2 of 1001".to_string(),
            "2025-01-01 08:05:00 - db - INFO - Updated IMAGE_NUMBER to 501_001 for all records of 1002".to_string(),
            "2025-01-01 08:06:00 - db - INFO - UPDATED r_num    TO 4 of 1003".to_string(),
            "2025-01-01 08:07:00 - db - INFO - done".to_string(),
        ];

        let sessions = reconstruct(&lines);
        let session = &sessions[0];

        assert_eq!(session.total_images(), 2);
        assert_eq!(
            session.record_sequences["1001"],
            BTreeSet::from([1, 2, 3])
        );
        assert!(session.record_sequences["1002"].is_empty());
        assert_eq!(session.record_sequences["1003"], BTreeSet::from([4]));
        // max(1001) + max(1002) + max(1003) = 3 + 0 + 4
        assert_eq!(session.total_record_count, 7);
        // No DOC_TYPE update: records with a non-empty sequence set
        assert_eq!(session.images_processed_count, 2);

        assert_eq!(
            session.image_sections["1001"],
            ImageSection {
                image_num: "500".to_string(),
                records_processed: 3
            }
        );
        assert_eq!(session.image_sections["1002"].records_processed, 0);
        assert!(!session.image_sections.contains_key("1003"));

        // r_num lines also count as field edits and generic updates
        assert_eq!(session.column_edits["r_num"], 4);
        assert_eq!(session.update_count, 4);
        assert_eq!(session.character_count, 4);
    }

    #[test]
    fn test_image_update_resets_section_progress() {
        let lines = vec![
            login("08:00:00", "alice"),
            "Updated IMAGE_NUMBER to 500_002 for all records of 1001".to_string(),
            "UPDATED r_num    TO 5 of 1001".to_string(),
            "Updated IMAGE_NUMBER to 502_001 for all records of 1001".to_string(),
        ];

        let sessions = reconstruct(&lines);
        let section = &sessions[0].image_sections["1001"];

        assert_eq!(section.image_num, "502");
        assert_eq!(section.records_processed, 0);
        assert_eq!(sessions[0].total_record_count, 5);
    }

    #[test]
    fn test_doc_type_overwrites_images_processed() {
        let lines = vec![
            login("08:00:00", "alice"),
            "UPDATED r_num    TO 1 of 1001".to_string(),
            "Updated DOC_TYPE for 12 local records".to_string(),
            "Updated DOC_TYPE for 7 local records".to_string(),
        ];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions[0].images_processed_count, 7);
    }

    #[test]
    fn test_field_edits_count_characters() {
        let lines = vec![
            login("08:00:00", "alice"),
            "UPDATED NAME from '' TO Jane Doe of 1001".to_string(),
            "UPDATED NAME from 'Jane Doe' TO Jané of 1001".to_string(),
            "UPDATED CITY from '' TO Oslo of 1001".to_string(),
            "UPDATED without a target".to_string(),
        ];

        let sessions = reconstruct(&lines);
        let session = &sessions[0];

        assert_eq!(session.column_edits["NAME"], 2);
        assert_eq!(session.column_edits["CITY"], 1);
        // "Jane Doe" + "Jané" + "Oslo", counted in characters
        assert_eq!(session.character_count, 16);
        assert_eq!(session.update_count, 4);
    }

    #[test]
    fn test_counters_reset_per_session() {
        let lines = vec![
            login("08:00:00", "alice"),
            "UPDATED NAME from '' TO Jane of 1001".to_string(),
            login("08:10:00", "bob"),
            "UPDATED CITY from '' TO Oslo of 1002".to_string(),
        ];

        let sessions = reconstruct(&lines);

        assert_eq!(sessions[0].column_edits.keys().collect::<Vec<_>>(), ["NAME"]);
        assert_eq!(sessions[1].column_edits.keys().collect::<Vec<_>>(), ["CITY"]);
    }

    #[test]
    fn test_current_user_tracks_latest_login() {
        let patterns = MarkerPatterns::new();
        let lines = vec![login("08:00:00", "alice"), login("08:10:00", "bob")];
        let mut reconstructor = SessionReconstructor::new("x.log");

        assert_eq!(reconstructor.current_user(), None);
        reconstructor.observe(&patterns, &lines, 0);
        assert_eq!(reconstructor.current_user(), Some("alice"));
        reconstructor.observe(&patterns, &lines, 1);
        assert_eq!(reconstructor.current_user(), Some("bob"));
        assert_eq!(reconstructor.current_date(), Some("2025-01-01"));
    }

    #[test]
    fn test_session_serializes_optional_end_time() {
        let lines = vec![login("09:00:00", "alice")];
        let sessions = reconstruct(&lines);

        let json = serde_json::to_value(&sessions[0]).unwrap();
        assert!(json["end_time"].is_null());
        assert_eq!(json["start_time"], "2025-01-01T09:00:00");
    }
}
