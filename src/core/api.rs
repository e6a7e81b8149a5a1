//! Abstract surface of the FileMaker Data API
//!
//! The session/retry wrapper in [`crate::core::client`] is written against
//! the [`RecordApi`] trait so it can be exercised without a live server.
//! The production implementation lives in [`crate::core::fm`].

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Data API code for an expired or invalid session token.
pub const CODE_SESSION_EXPIRED: i64 = 952;

/// Data API code for "no records match the request".
pub const CODE_NO_MATCH: i64 = 401;

/// Session token issued by sign-in.
///
/// Only valid for the session that produced it; record handles fetched
/// under one token must be refetched after re-authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One conjunction of field-equality terms for a find request.
///
/// All terms within a group must match; separate groups are OR'd together
/// by the server.
pub type QueryGroup = Vec<(String, String)>;

/// Server-side sort order for one field of a record fetch.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// A record as returned by the Data API: the session-scoped handle plus a
/// raw field map. Typed views are built from this at the API boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRecord {
    /// Session-scoped record handle; required for edits, invalid after
    /// reconnection.
    #[serde(rename = "recordId")]
    pub record_id: String,

    /// Modification counter (unused for now; edits are unconditional).
    #[serde(rename = "modId", default)]
    pub mod_id: String,

    #[serde(rename = "fieldData")]
    pub fields: Map<String, Value>,
}

/// Errors surfaced by a [`RecordApi`] implementation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a Data API response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-zero Data API code.
    #[error("server fault {code}: {message}")]
    Fault { code: i64, message: String },
}

/// Structured classification of a fault, matched by status code rather
/// than by searching error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Code 952: the session token has expired or was invalidated.
    SessionExpired,
    /// Code 401: zero records satisfied the query. A valid empty result,
    /// not a failure.
    NoMatch,
    /// Anything else, including transport-level failures.
    Other,
}

impl ApiError {
    pub fn kind(&self) -> FaultKind {
        match self {
            ApiError::Fault {
                code: CODE_SESSION_EXPIRED,
                ..
            } => FaultKind::SessionExpired,
            ApiError::Fault {
                code: CODE_NO_MATCH,
                ..
            } => FaultKind::NoMatch,
            _ => FaultKind::Other,
        }
    }
}

/// Verdict of the connectivity probe run after a transport-level sign-in
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The record server did not answer, but the wider network did.
    ServerUnreachable,
    /// Not even a known-good external endpoint answered.
    NoNetwork,
}

/// The remote record API, reduced to the four operations this toolkit
/// needs. No caller invokes an implementation directly; everything goes
/// through the retry/re-auth wrapper in [`crate::core::client`].
pub trait RecordApi {
    /// Establish a session and return its token.
    fn sign_in(&self, user: &str, password: &str) -> Result<SessionToken, ApiError>;

    /// Find records matching the given field-equality groups.
    fn find(
        &self,
        token: &SessionToken,
        layout: &str,
        query: &[QueryGroup],
    ) -> Result<Vec<WireRecord>, ApiError>;

    /// Fetch up to `limit` records sorted server-side.
    fn fetch_page(
        &self,
        token: &SessionToken,
        layout: &str,
        sort: &[SortSpec],
        limit: u32,
    ) -> Result<Vec<WireRecord>, ApiError>;

    /// Apply a field-level edit to the record behind `record_id`.
    fn edit(
        &self,
        token: &SessionToken,
        layout: &str,
        record_id: &str,
        changes: &Map<String, Value>,
    ) -> Result<(), ApiError>;

    /// Diagnose connectivity after a transport-level sign-in failure, by
    /// probing the server and then a known-reachable external endpoint.
    fn diagnose(&self) -> Connectivity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kind_by_code() {
        let expired = ApiError::Fault {
            code: 952,
            message: "Invalid FileMaker Data API token".into(),
        };
        assert_eq!(expired.kind(), FaultKind::SessionExpired);

        let no_match = ApiError::Fault {
            code: 401,
            message: "No records match the request".into(),
        };
        assert_eq!(no_match.kind(), FaultKind::NoMatch);

        let other = ApiError::Fault {
            code: 102,
            message: "Field is missing".into(),
        };
        assert_eq!(other.kind(), FaultKind::Other);
    }

    #[test]
    fn test_transport_is_other() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.kind(), FaultKind::Other);
    }
}
