//! Person record view
//!
//! The people table keeps historical rows, so one internal key can map to
//! several rows of which at most one is active. Callers that need "the"
//! person behind a key go through [`collapse_active`].

use serde_json::{Map, Value};

use crate::core::api::WireRecord;
use crate::entities::record::{self, RecordError};

/// Layout field names for the people table.
pub mod fields {
    pub const ID: &str = "ID_Primary";
    pub const FIRST_NAME: &str = "NameFirst";
    pub const LAST_NAME: &str = "NameLast";
    pub const ACTIVE: &str = "Active_c";
}

/// A person row as read from the people layout.
#[derive(Debug, Clone)]
pub struct PersonRecord {
    /// Session-scoped record handle.
    pub handle: String,
    /// Stable internal primary key; shared by historical duplicates.
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// At most one row per internal key carries this flag.
    pub active: bool,
    /// Layout fields this view does not model, kept as raw values.
    pub extra: Map<String, Value>,
}

impl PersonRecord {
    /// "First Last", as written into audit notes.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "Last, First", used for operator-facing listings.
    pub fn sort_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl TryFrom<WireRecord> for PersonRecord {
    type Error = RecordError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let WireRecord {
            record_id,
            mut fields,
            ..
        } = wire;

        let id = record::require_i64(&fields, &record_id, fields::ID)?;
        let first_name = record::opt_str(&fields, fields::FIRST_NAME).unwrap_or_default();
        let last_name = record::opt_str(&fields, fields::LAST_NAME).unwrap_or_default();
        let active = record::flag(&fields, fields::ACTIVE);

        for known in [fields::ID, fields::FIRST_NAME, fields::LAST_NAME, fields::ACTIVE] {
            fields.remove(known);
        }

        Ok(Self {
            handle: record_id,
            id,
            first_name,
            last_name,
            active,
            extra: fields,
        })
    }
}

/// Collapse historical duplicates down to one row per internal key.
///
/// The active row wins when one exists; remaining ties are broken by
/// record handle so the outcome never depends on input order.
pub fn collapse_active(mut people: Vec<PersonRecord>) -> Vec<PersonRecord> {
    people.sort_by(|a, b| {
        a.id.cmp(&b.id)
            .then(b.active.cmp(&a.active))
            .then(a.handle.cmp(&b.handle))
    });
    people.dedup_by_key(|p| p.id);
    people
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(handle: &str, id: i64, first: &str, last: &str, active: bool) -> PersonRecord {
        PersonRecord {
            handle: handle.to_string(),
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            active,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_person_from_wire() {
        let wire: WireRecord = serde_json::from_value(serde_json::json!({
            "recordId": "31",
            "modId": "0",
            "fieldData": {
                "ID_Primary": "88",
                "NameFirst": "Jane",
                "NameLast": "Doe",
                "Active_c": 1,
                "Title": "Associate Director",
            },
        }))
        .unwrap();

        let person = PersonRecord::try_from(wire).unwrap();
        assert_eq!(person.id, 88);
        assert!(person.active);
        assert_eq!(person.display_name(), "Jane Doe");
        assert_eq!(person.extra["Title"], "Associate Director");
    }

    #[test]
    fn test_display_and_sort_names() {
        let p = person("1", 7, "Jane", "Doe", true);
        assert_eq!(p.display_name(), "Jane Doe");
        assert_eq!(p.sort_name(), "Doe, Jane");
    }

    #[test]
    fn test_collapse_prefers_active_regardless_of_order() {
        let forward = vec![
            person("10", 7, "Jane", "Doe", false),
            person("11", 7, "Jane", "Doe-Smith", true),
            person("12", 8, "John", "Smith", true),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        for input in [forward, reversed] {
            let collapsed = collapse_active(input);
            assert_eq!(collapsed.len(), 2);
            assert_eq!(collapsed[0].id, 7);
            assert_eq!(collapsed[0].last_name, "Doe-Smith");
            assert!(collapsed[0].active);
            assert_eq!(collapsed[1].id, 8);
        }
    }

    #[test]
    fn test_collapse_all_inactive_is_deterministic() {
        let a = vec![
            person("21", 5, "Old", "RowB", false),
            person("20", 5, "Old", "RowA", false),
        ];
        let b = vec![
            person("20", 5, "Old", "RowA", false),
            person("21", 5, "Old", "RowB", false),
        ];
        assert_eq!(collapse_active(a)[0].handle, "20");
        assert_eq!(collapse_active(b)[0].handle, "20");
    }
}
