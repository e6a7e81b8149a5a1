//! Project record view
//!
//! A project is keyed two ways: the project number is the business key
//! operators and the archives database use, and `ID_Primary` is the stable
//! internal key used for table relationships. The number may be stale or
//! duplicated; `ID_Primary` never is.

use serde_json::{Map, Value};

use crate::core::api::WireRecord;
use crate::entities::record::{self, RecordError};

/// Layout field names for the projects table.
pub mod fields {
    pub const ID: &str = "ID_Primary";
    pub const NUMBER: &str = "ProjectNumber";
    pub const NAME: &str = "ProjectName";
    pub const NOTES: &str = "Notes";
    pub const MANAGER_ID: &str = "ID_ProjectManager";
    pub const LOCATION: &str = "FileServerLocation";
}

/// A project row as read from the projects layout.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    /// Session-scoped record handle, needed for edits.
    pub handle: String,
    /// Stable internal primary key.
    pub id: i64,
    /// Business key; compared trimmed.
    pub number: String,
    pub name: String,
    /// Append-only history text.
    pub notes: Option<String>,
    /// Internal key of the managing person, when one is assigned.
    pub manager_id: Option<i64>,
    /// File-server location, as last written.
    pub location: Option<String>,
    /// Layout fields this view does not model, kept as raw values.
    pub extra: Map<String, Value>,
}

impl TryFrom<WireRecord> for ProjectRecord {
    type Error = RecordError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let WireRecord {
            record_id,
            mut fields,
            ..
        } = wire;

        let id = record::require_i64(&fields, &record_id, fields::ID)?;
        let number = record::require_str(&fields, &record_id, fields::NUMBER)?;
        let name = record::opt_str(&fields, fields::NAME).unwrap_or_default();
        let notes = record::opt_str(&fields, fields::NOTES);
        let manager_id = record::opt_i64(&fields, &record_id, fields::MANAGER_ID)?;
        let location = record::opt_str(&fields, fields::LOCATION);

        for known in [
            fields::ID,
            fields::NUMBER,
            fields::NAME,
            fields::NOTES,
            fields::MANAGER_ID,
            fields::LOCATION,
        ] {
            fields.remove(known);
        }

        Ok(Self {
            handle: record_id,
            id,
            number,
            name,
            notes,
            manager_id,
            location,
            extra: fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(fields: Value) -> WireRecord {
        serde_json::from_value(json!({
            "recordId": "55",
            "modId": "2",
            "fieldData": fields,
        }))
        .unwrap()
    }

    #[test]
    fn test_project_from_wire() {
        let project = ProjectRecord::try_from(wire(json!({
            "ID_Primary": "7301",
            "ProjectNumber": " 1234 ",
            "ProjectName": "Coastal Lab Renovation",
            "Notes": "",
            "ID_ProjectManager": 88,
            "FileServerLocation": "C:\\PPDO\\Records\\2024\\ABC",
            "DateCreated": "01/02/2024",
        })))
        .unwrap();

        assert_eq!(project.handle, "55");
        assert_eq!(project.id, 7301);
        assert_eq!(project.number, " 1234 ");
        assert_eq!(project.name, "Coastal Lab Renovation");
        assert_eq!(project.notes, None);
        assert_eq!(project.manager_id, Some(88));
        assert_eq!(
            project.location.as_deref(),
            Some("C:\\PPDO\\Records\\2024\\ABC")
        );
        // Unmodeled fields survive in the extension map.
        assert_eq!(project.extra["DateCreated"], "01/02/2024");
    }

    #[test]
    fn test_project_without_manager() {
        let project = ProjectRecord::try_from(wire(json!({
            "ID_Primary": 9,
            "ProjectNumber": "0001",
            "ProjectName": "x",
            "ID_ProjectManager": "",
        })))
        .unwrap();
        assert_eq!(project.manager_id, None);
    }

    #[test]
    fn test_project_requires_internal_key() {
        let err = ProjectRecord::try_from(wire(json!({
            "ProjectNumber": "0001",
        })))
        .unwrap_err();
        assert!(err.to_string().contains("ID_Primary"));
    }
}
