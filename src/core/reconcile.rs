//! Reconciliation engine
//!
//! Walks the archives rows in retrieval order and brings the matching
//! FileMaker projects up to date. Resolution is deliberately cautious:
//! a row is only applied when the project number resolves to exactly one
//! record *and* a second lookup by internal key confirms it. Everything
//! else is tallied and skipped; one bad row never stops the batch.

use serde_json::{Map, Value};
use std::fmt;

use crate::core::api::RecordApi;
use crate::core::client::{ClientError, RecordClient};
use crate::core::paths;
use crate::core::source::SourceRow;
use crate::entities::project;

/// Outcome tally for one engine lifetime. Resets only when a new engine
/// is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTally {
    pub updated: u64,
    pub not_found_in_remote: u64,
    pub not_found_in_source: u64,
    pub ambiguous_match: u64,
    pub id_not_confirmed: u64,
    pub errors: u64,
    /// Project numbers actually edited, in application order.
    pub modified: Vec<String>,
}

impl fmt::Display for SyncTally {
    /// Fixed field order; the batch log summary depends on it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project locations updated:       {}", self.updated)?;
        writeln!(
            f,
            "Projects not found in FileMaker: {}",
            self.not_found_in_remote
        )?;
        writeln!(
            f,
            "Projects not found in archives:  {}",
            self.not_found_in_source
        )?;
        writeln!(
            f,
            "Multiple projects in FileMaker:  {}",
            self.ambiguous_match
        )?;
        writeln!(
            f,
            "IDs not confirmed in FileMaker:  {}",
            self.id_not_confirmed
        )?;
        write!(f, "Rows failed with errors:         {}", self.errors)
    }
}

/// The reconciliation engine. Owns the record client (and with it the
/// session) for its whole lifetime.
pub struct Reconciler<A: RecordApi> {
    client: RecordClient<A>,
    mount_prefix: String,
    tally: SyncTally,
}

enum RowOutcome {
    Updated,
    NotFoundInRemote,
    AmbiguousMatch,
    IdNotConfirmed,
    EditUnapplied,
}

impl<A: RecordApi> Reconciler<A> {
    pub fn new(client: RecordClient<A>, mount_prefix: impl Into<String>) -> Self {
        Self {
            client,
            mount_prefix: mount_prefix.into(),
            tally: SyncTally::default(),
        }
    }

    pub fn tally(&self) -> &SyncTally {
        &self.tally
    }

    /// Process every row, strictly in order. Row-level failures are
    /// logged, counted and skipped.
    pub fn run(&mut self, rows: &[SourceRow]) -> &SyncTally {
        for row in rows {
            match self.sync_row(row) {
                Ok(RowOutcome::Updated) => {
                    self.tally.updated += 1;
                    self.tally.modified.push(row.number.trim().to_string());
                }
                Ok(RowOutcome::NotFoundInRemote) => self.tally.not_found_in_remote += 1,
                Ok(RowOutcome::AmbiguousMatch) => self.tally.ambiguous_match += 1,
                Ok(RowOutcome::IdNotConfirmed) => self.tally.id_not_confirmed += 1,
                Ok(RowOutcome::EditUnapplied) => self.tally.errors += 1,
                Err(err) => {
                    tracing::error!(number = %row.number, error = %err, "row failed; continuing");
                    self.tally.errors += 1;
                }
            }
        }
        &self.tally
    }

    fn sync_row(&mut self, row: &SourceRow) -> Result<RowOutcome, ClientError> {
        let number = row.number.trim();

        let candidates = self.client.find_projects_by_number(number)?;
        if candidates.is_empty() {
            tracing::warn!(number = %number, "project not found in FileMaker");
            return Ok(RowOutcome::NotFoundInRemote);
        }

        // The number field is a loose match server-side; narrow it to
        // exact, trimmed equality before trusting it.
        let exact: Vec<_> = candidates
            .iter()
            .filter(|candidate| candidate.number.trim() == number)
            .collect();

        let target_id = match exact.as_slice() {
            [] => {
                tracing::warn!(number = %number, "project not found in FileMaker");
                return Ok(RowOutcome::NotFoundInRemote);
            }
            [only] => only.id,
            _ => {
                tracing::warn!(number = %number, count = exact.len(), "multiple projects match; not updating");
                return Ok(RowOutcome::AmbiguousMatch);
            }
        };

        // Re-fetch by internal key before mutating, in case the number
        // index was stale or non-unique at the moment of resolution.
        let confirmed = self.client.find_projects_by_id(target_id)?;
        if confirmed.len() != 1 {
            tracing::warn!(number = %number, id = target_id, found = confirmed.len(), "id lookup did not confirm a single record");
            return Ok(RowOutcome::IdNotConfirmed);
        }

        let location = paths::reroot(&row.location, &self.mount_prefix)
            .display()
            .to_string();
        let mut changes = Map::new();
        changes.insert(
            project::fields::LOCATION.to_string(),
            Value::String(location.clone()),
        );

        if !self.client.edit_project(&confirmed[0].handle, &changes)? {
            tracing::warn!(number = %number, "edit was not applied; record vanished mid-update");
            return Ok(RowOutcome::EditUnapplied);
        }

        tracing::info!(number = %number, location = %location, "project location updated");
        Ok(RowOutcome::Updated)
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &RecordClient<A> {
        &self.client
    }
}
