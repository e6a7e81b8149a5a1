//! Archives database row source
//!
//! The archives PostgreSQL database is the source of truth for project
//! file-server locations. This module reads the rows; it never writes.

use postgres::{Client, NoTls};
use thiserror::Error;

use crate::core::config::{ArchivesConfig, Credentials};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("archives database error: {0}")]
    Postgres(#[from] postgres::Error),
}

/// One source-of-truth row: a project number and where its records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub number: String,
    pub location: String,
}

/// Connection to the archives database.
pub struct ArchiveSource {
    client: Client,
}

impl ArchiveSource {
    pub fn connect(
        archives: &ArchivesConfig,
        credentials: &Credentials,
    ) -> Result<Self, SourceError> {
        let client = Client::connect(&archives.conninfo(credentials), NoTls)?;
        Ok(Self { client })
    }

    /// All projects that have a recorded file-server location, in the
    /// order the database returns them. Rows with an empty location are
    /// dropped here so downstream code never sees them.
    pub fn project_locations(&mut self) -> Result<Vec<SourceRow>, SourceError> {
        let rows = self.client.query(
            "SELECT number::text, file_server_location \
             FROM projects \
             WHERE file_server_location IS NOT NULL",
            &[],
        )?;

        let mut locations = Vec::with_capacity(rows.len());
        for row in rows {
            let number: String = row.get(0);
            let location: String = row.get(1);
            if location.trim().is_empty() {
                tracing::debug!(number = %number, "skipping row with blank location");
                continue;
            }
            locations.push(SourceRow { number, location });
        }
        Ok(locations)
    }
}
