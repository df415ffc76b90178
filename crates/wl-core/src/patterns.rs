//! Marker grammars recognized in application log lines.
//!
//! Patterns are compiled into plain structs owned by a single file analysis,
//! so nothing is shared between files.

use chrono::NaiveDateTime;
use regex::Regex;

use crate::timestamp::parse_timestamp;

/// Substring identifying a login line, used where a full match isn't needed.
pub const LOGIN_MARKER: &str = "- config - INFO - Logging initialized for user:";

const LOGIN: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) - (?:config) - INFO - Logging initialized for user: (.+) on (\d{4}-\d{2}-\d{2})";
const IMAGE_UPDATE: &str = r"Updated IMAGE_NUMBER to (\d+)_\d+ for all records of (\d+)";
const OCR_IMAGE: &str = r"Updated IMAGE_NUMBER to (\d+)_00(\d+) for all records of (\d+)";
const FIELD_EDIT: &str = r"UPDATED (\w+) .+ TO (.+?) of (\d+)";
const SEQUENCE_UPDATE: &str = r"UPDATED r_num\s+TO (\d+) of (\d+)";
const DOC_TYPE_UPDATE: &str = r"Updated DOC_TYPE for (\d+) local records";
const CLIPBOARD: &str = r"Text copied to clipboard: '(.+)'";
const OCR_START: &str =
    r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) - scripts\.config - INFO - HWR mode set to True";
const OCR_END: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) - scripts\.config - DEBUG - Text copied to clipboard: '(.+)'";
const SHORTCUT: &str =
    r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} - scripts\.config - INFO - ([\w+]+) pressed";
const TRAILING_RECORD: &str = r"of (\d+)$";

/// Token counted by the generic update counter.
const UPDATE_TOKEN: &str = "UPDATED";

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time literals covered by the tests below
    Regex::new(pattern).unwrap()
}

/// A parsed login marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub at: NaiveDateTime,
    pub user: String,
    pub date: String,
}

/// `Updated IMAGE_NUMBER to <num>_<seq> for all records of <record_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageUpdate<'a> {
    pub image_num: &'a str,
    pub record_id: &'a str,
}

/// Stricter `IMAGE_NUMBER` form (`<num>_00<seq>`) that selects an OCR target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrImage<'a> {
    pub image_num: &'a str,
    pub seq: &'a str,
    pub image_id: &'a str,
}

/// `UPDATED <column> ... TO <value> of <record_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEdit<'a> {
    pub column: &'a str,
    pub value: &'a str,
    pub record_id: &'a str,
}

/// `UPDATED r_num TO <seq> of <record_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceUpdate<'a> {
    pub seq: u64,
    pub record_id: &'a str,
}

/// Debug-level clipboard copy that closes an OCR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrEnd<'a> {
    pub at: NaiveDateTime,
    pub text: &'a str,
}

/// The login grammar on its own, for passes that only track the current user.
#[derive(Debug, Clone)]
pub struct LoginPattern(Regex);

impl LoginPattern {
    pub fn new() -> Self {
        Self(compile(LOGIN))
    }

    /// Parse a login marker. A login whose timestamp doesn't parse is not a login.
    pub fn parse(&self, line: &str) -> Option<Login> {
        let caps = self.0.captures(line)?;
        let Some(at) = parse_timestamp(&caps[1]) else {
            tracing::trace!(line, "login marker with invalid timestamp");
            return None;
        };
        Some(Login {
            at,
            user: caps[2].to_string(),
            date: caps[3].to_string(),
        })
    }
}

impl Default for LoginPattern {
    fn default() -> Self {
        Self::new()
    }
}

/// Every marker grammar used by the activity pass.
#[derive(Debug, Clone)]
pub struct MarkerPatterns {
    pub login: LoginPattern,
    image_update: Regex,
    ocr_image: Regex,
    field_edit: Regex,
    sequence_update: Regex,
    doc_type_update: Regex,
    clipboard: Regex,
    ocr_start: Regex,
    ocr_end: Regex,
    shortcut: Regex,
    trailing_record: Regex,
}

impl MarkerPatterns {
    pub fn new() -> Self {
        Self {
            login: LoginPattern::new(),
            image_update: compile(IMAGE_UPDATE),
            ocr_image: compile(OCR_IMAGE),
            field_edit: compile(FIELD_EDIT),
            sequence_update: compile(SEQUENCE_UPDATE),
            doc_type_update: compile(DOC_TYPE_UPDATE),
            clipboard: compile(CLIPBOARD),
            ocr_start: compile(OCR_START),
            ocr_end: compile(OCR_END),
            shortcut: compile(SHORTCUT),
            trailing_record: compile(TRAILING_RECORD),
        }
    }

    pub fn image_update<'a>(&self, line: &'a str) -> Option<ImageUpdate<'a>> {
        let caps = self.image_update.captures(line)?;
        Some(ImageUpdate {
            image_num: caps.get(1)?.as_str(),
            record_id: caps.get(2)?.as_str(),
        })
    }

    pub fn ocr_image<'a>(&self, line: &'a str) -> Option<OcrImage<'a>> {
        let caps = self.ocr_image.captures(line)?;
        Some(OcrImage {
            image_num: caps.get(1)?.as_str(),
            seq: caps.get(2)?.as_str(),
            image_id: caps.get(3)?.as_str(),
        })
    }

    pub fn field_edit<'a>(&self, line: &'a str) -> Option<FieldEdit<'a>> {
        let caps = self.field_edit.captures(line)?;
        Some(FieldEdit {
            column: caps.get(1)?.as_str(),
            value: caps.get(2)?.as_str(),
            record_id: caps.get(3)?.as_str(),
        })
    }

    pub fn sequence_update<'a>(&self, line: &'a str) -> Option<SequenceUpdate<'a>> {
        let caps = self.sequence_update.captures(line)?;
        Some(SequenceUpdate {
            seq: caps.get(1)?.as_str().parse().ok()?,
            record_id: caps.get(2)?.as_str(),
        })
    }

    /// Record count from a `DOC_TYPE` batch update.
    pub fn doc_type_update(&self, line: &str) -> Option<u32> {
        self.doc_type_update.captures(line)?.get(1)?.as_str().parse().ok()
    }

    /// Payload of any clipboard copy line, whatever its level.
    pub fn clipboard<'a>(&self, line: &'a str) -> Option<&'a str> {
        Some(self.clipboard.captures(line)?.get(1)?.as_str())
    }

    pub fn ocr_start(&self, line: &str) -> Option<NaiveDateTime> {
        parse_timestamp(self.ocr_start.captures(line)?.get(1)?.as_str())
    }

    pub fn ocr_end<'a>(&self, line: &'a str) -> Option<OcrEnd<'a>> {
        let caps = self.ocr_end.captures(line)?;
        Some(OcrEnd {
            at: parse_timestamp(caps.get(1)?.as_str())?,
            text: caps.get(2)?.as_str(),
        })
    }

    /// Key name of a shortcut press.
    pub fn shortcut<'a>(&self, line: &'a str) -> Option<&'a str> {
        Some(self.shortcut.captures(line)?.get(1)?.as_str())
    }

    /// Record id at the very end of a line (`... of <digits>`).
    pub fn trailing_record<'a>(&self, line: &'a str) -> Option<&'a str> {
        Some(self.trailing_record.captures(line)?.get(1)?.as_str())
    }
}

impl Default for MarkerPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Any line carrying the `UPDATED` token.
pub fn is_update(line: &str) -> bool {
    line.contains(UPDATE_TOKEN)
}

/// Whether clipboard text looks like an extracted person name: two or more
/// whitespace-separated tokens.
pub fn is_name_like(text: &str) -> bool {
    text.split_whitespace().nth(1).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_all_patterns_compile() {
        let _ = MarkerPatterns::new();
    }

    #[test]
    fn test_login_parses_user_and_date() {
        let login = LoginPattern::new()
            .parse("2025-01-01 08:00:00 - config - INFO - Logging initialized for user: alice smith on 2025-01-01")
            .unwrap();
        assert_eq!(login.user, "alice smith");
        assert_eq!(login.date, "2025-01-01");
        assert_eq!(
            login.at,
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_login_requires_config_namespace() {
        let login = LoginPattern::new().parse(
            "2025-01-01 08:00:00 - scripts.config - INFO - Logging initialized for user: alice on 2025-01-01",
        );
        assert!(login.is_none());
    }

    #[test]
    fn test_login_with_invalid_timestamp_is_ignored() {
        let login = LoginPattern::new().parse(
            "2025-13-41 08:00:00 - config - INFO - Logging initialized for user: alice on 2025-01-01",
        );
        assert!(login.is_none());
    }

    #[test]
    fn test_image_update_and_ocr_image() {
        let p = MarkerPatterns::new();
        let line = "2025-01-01 08:01:00 - db - INFO - Updated IMAGE_NUMBER to 500_002 for all records of 1001";
        assert_eq!(
            p.image_update(line),
            Some(ImageUpdate {
                image_num: "500",
                record_id: "1001"
            })
        );
        assert_eq!(
            p.ocr_image(line),
            Some(OcrImage {
                image_num: "500",
                seq: "2",
                image_id: "1001"
            })
        );
    }

    #[test]
    fn test_ocr_image_requires_zero_padded_suffix() {
        let p = MarkerPatterns::new();
        let line = "Updated IMAGE_NUMBER to 500_12 for all records of 1001";
        assert!(p.image_update(line).is_some());
        assert!(p.ocr_image(line).is_none());
    }

    #[test]
    fn test_field_edit_value_is_lazy() {
        let p = MarkerPatterns::new();
        let edit = p
            .field_edit("UPDATED NAME from 'x' TO Jane Doe of 1001")
            .unwrap();
        assert_eq!(edit.column, "NAME");
        assert_eq!(edit.value, "Jane Doe");
        assert_eq!(edit.record_id, "1001");
    }

    #[test]
    fn test_sequence_update_also_matches_field_edit() {
        let p = MarkerPatterns::new();
        let line = "UPDATED r_num    TO 3 of 1001";
        assert_eq!(
            p.sequence_update(line),
            Some(SequenceUpdate {
                seq: 3,
                record_id: "1001"
            })
        );
        let edit = p.field_edit(line).unwrap();
        assert_eq!(edit.column, "r_num");
        assert_eq!(edit.value, "3");
    }

    #[test]
    fn test_doc_type_update() {
        let p = MarkerPatterns::new();
        assert_eq!(p.doc_type_update("Updated DOC_TYPE for 12 local records"), Some(12));
        assert_eq!(p.doc_type_update("Updated DOC_TYPE for local records"), None);
    }

    #[test]
    fn test_ocr_start_and_end() {
        let p = MarkerPatterns::new();
        assert!(
            p.ocr_start("2025-01-01 08:00:00 - scripts.config - INFO - HWR mode set to True")
                .is_some()
        );
        assert!(
            p.ocr_start("2025-01-01 08:00:00 - scripts.config - INFO - HWR mode set to False")
                .is_none()
        );

        let end = p
            .ocr_end("2025-01-01 08:00:04 - scripts.config - DEBUG - Text copied to clipboard: 'Jane Doe'")
            .unwrap();
        assert_eq!(end.text, "Jane Doe");

        // INFO-level clipboard lines are plain clipboard events, not OCR ends
        let info = "2025-01-01 08:00:04 - scripts.config - INFO - Text copied to clipboard: 'Jane Doe'";
        assert!(p.ocr_end(info).is_none());
        assert_eq!(p.clipboard(info), Some("Jane Doe"));
    }

    #[test]
    fn test_shortcut() {
        let p = MarkerPatterns::new();
        assert_eq!(
            p.shortcut("2025-01-01 08:00:00 - scripts.config - INFO - ctrl+s pressed"),
            Some("ctrl+s")
        );
        assert_eq!(
            p.shortcut("2025-01-01 08:00:00 - config - INFO - ctrl+s pressed"),
            None
        );
    }

    #[test]
    fn test_trailing_record() {
        let p = MarkerPatterns::new();
        assert_eq!(p.trailing_record("saved page 2 of 4417"), Some("4417"));
        assert_eq!(p.trailing_record("saved page 2 of 4417 records"), None);
    }

    #[test]
    fn test_is_name_like() {
        assert!(is_name_like("Jane Doe"));
        assert!(is_name_like("  Jane\tvan Doe "));
        assert!(!is_name_like("12345"));
        assert!(!is_name_like("  Jane  "));
        assert!(!is_name_like(""));
    }

    #[test]
    fn test_is_update() {
        assert!(is_update("x UPDATED y"));
        assert!(!is_update("Updated DOC_TYPE for 3 local records"));
    }
}
