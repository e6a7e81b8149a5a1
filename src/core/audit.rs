//! Audit note construction for manager changes
//!
//! Every manager reassignment leaves a one-line trail in the project's
//! notes field. Notes are append-only: the new line goes above whatever
//! was there before, and prior content is never discarded.

use chrono::NaiveDateTime;

/// Timestamp format used in audit notes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the single-line note recording a manager change.
pub fn build_note(
    previous_manager: Option<&str>,
    new_manager: &str,
    at: NaiveDateTime,
) -> String {
    let verb = match previous_manager {
        Some(previous) => format!("changed from {previous} to"),
        None => "set to".to_string(),
    };
    format!(
        "Project PM {verb} {new_manager} on {}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Prepend a note above any existing notes text.
pub fn prepend_note(existing: Option<&str>, note: &str) -> String {
    match existing.map(str::trim_end).filter(|text| !text.is_empty()) {
        Some(prior) => format!("{note}\n{prior}"),
        None => note.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_note_for_first_assignment() {
        assert_eq!(
            build_note(None, "Jane Doe", at()),
            "Project PM set to Jane Doe on 2024-01-05 10:00:00"
        );
    }

    #[test]
    fn test_note_for_reassignment() {
        assert_eq!(
            build_note(Some("John Smith"), "Jane Doe", at()),
            "Project PM changed from John Smith to Jane Doe on 2024-01-05 10:00:00"
        );
    }

    #[test]
    fn test_prepend_keeps_prior_content_below() {
        let merged = prepend_note(
            Some("Project PM set to John Smith on 2022-03-01 09:30:00"),
            "Project PM changed from John Smith to Jane Doe on 2024-01-05 10:00:00",
        );
        assert_eq!(
            merged,
            "Project PM changed from John Smith to Jane Doe on 2024-01-05 10:00:00\n\
             Project PM set to John Smith on 2022-03-01 09:30:00"
        );
    }

    #[test]
    fn test_prepend_into_empty_notes() {
        assert_eq!(prepend_note(None, "note"), "note");
        assert_eq!(prepend_note(Some("  "), "note"), "note");
    }
}
