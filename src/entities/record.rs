//! Field-map coercion helpers shared by the typed record views
//!
//! FileMaker field values arrive as whatever JSON type the layout felt
//! like producing: numbers may be numbers or numeric strings, and an empty
//! string stands in for "no value". The helpers here normalize that at the
//! API boundary so the rest of the crate never touches raw field maps.

use serde_json::{Map, Value};
use thiserror::Error;

/// A record that could not be converted into its typed view.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record {record_id}: required field '{field}' is missing or empty")]
    Missing { record_id: String, field: String },

    #[error("record {record_id}: field '{field}' holds unusable value {value}")]
    Invalid {
        record_id: String,
        field: String,
        value: Value,
    },
}

/// Read a field as a non-empty string. Empty and whitespace-only values
/// count as absent; numbers are rendered as their literal text.
pub fn opt_str(fields: &Map<String, Value>, field: &str) -> Option<String> {
    match fields.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a field as an integer, accepting both numbers and numeric strings.
/// Empty values are absent; non-numeric text is an error.
pub fn opt_i64(
    fields: &Map<String, Value>,
    record_id: &str,
    field: &str,
) -> Result<Option<i64>, RecordError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            // FileMaker renders integer keys as "7" or "7.0" depending on
            // the field's display format.
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
                .map(Some)
                .map_err(|_| RecordError::Invalid {
                    record_id: record_id.to_string(),
                    field: field.to_string(),
                    value: Value::String(s.clone()),
                })
        }
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| RecordError::Invalid {
                record_id: record_id.to_string(),
                field: field.to_string(),
                value: Value::Number(n.clone()),
            }),
        Some(other) => Err(RecordError::Invalid {
            record_id: record_id.to_string(),
            field: field.to_string(),
            value: other.clone(),
        }),
    }
}

/// Read a required integer field.
pub fn require_i64(
    fields: &Map<String, Value>,
    record_id: &str,
    field: &str,
) -> Result<i64, RecordError> {
    opt_i64(fields, record_id, field)?.ok_or_else(|| RecordError::Missing {
        record_id: record_id.to_string(),
        field: field.to_string(),
    })
}

/// Read a required non-empty string field.
pub fn require_str(
    fields: &Map<String, Value>,
    record_id: &str,
    field: &str,
) -> Result<String, RecordError> {
    opt_str(fields, field).ok_or_else(|| RecordError::Missing {
        record_id: record_id.to_string(),
        field: field.to_string(),
    })
}

/// Read a boolean flag stored FileMaker-style: 1/"1" is set, everything
/// else (0, "", absent) is clear.
pub fn flag(fields: &Map<String, Value>, field: &str) -> bool {
    match fields.get(field) {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "1.0"),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_opt_str_empty_is_absent() {
        let f = fields(json!({"a": "", "b": "  ", "c": "x", "d": 12}));
        assert_eq!(opt_str(&f, "a"), None);
        assert_eq!(opt_str(&f, "b"), None);
        assert_eq!(opt_str(&f, "c"), Some("x".to_string()));
        assert_eq!(opt_str(&f, "d"), Some("12".to_string()));
        assert_eq!(opt_str(&f, "missing"), None);
    }

    #[test]
    fn test_opt_i64_coercions() {
        let f = fields(json!({"n": 7, "s": "8", "f": "9.0", "e": "", "bad": "abc"}));
        assert_eq!(opt_i64(&f, "1", "n").unwrap(), Some(7));
        assert_eq!(opt_i64(&f, "1", "s").unwrap(), Some(8));
        assert_eq!(opt_i64(&f, "1", "f").unwrap(), Some(9));
        assert_eq!(opt_i64(&f, "1", "e").unwrap(), None);
        assert_eq!(opt_i64(&f, "1", "missing").unwrap(), None);
        assert!(opt_i64(&f, "1", "bad").is_err());
    }

    #[test]
    fn test_require_reports_record_and_field() {
        let f = fields(json!({}));
        let err = require_i64(&f, "42", "ID_Primary").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("42"));
        assert!(text.contains("ID_Primary"));
    }

    #[test]
    fn test_flag_variants() {
        let f = fields(json!({"a": 1, "b": "1", "c": 0, "d": "", "e": "0"}));
        assert!(flag(&f, "a"));
        assert!(flag(&f, "b"));
        assert!(!flag(&f, "c"));
        assert!(!flag(&f, "d"));
        assert!(!flag(&f, "e"));
        assert!(!flag(&f, "missing"));
    }
}
