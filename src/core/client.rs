//! Session-transparent record client
//!
//! Wraps a [`RecordApi`] behind a bounded retry policy: expired sessions
//! are re-authenticated on the fly, "no match" answers come back as empty
//! results, and anything else is retried until the attempt budget runs
//! out. Callers never see a session token and never talk to the raw API.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::api::{
    ApiError, Connectivity, FaultKind, QueryGroup, RecordApi, SessionToken, SortSpec, WireRecord,
};
use crate::core::config::{Credentials, Layouts};
use crate::entities::person::{self, PersonRecord};
use crate::entities::project::{self, ProjectRecord};
use crate::entities::record::RecordError;

/// Default attempt budget for one remote operation.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Errors that can occur while talking to the record server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("record server unreachable at {url}")]
    ServerUnreachable { url: String },

    #[error("no network path available (external probe failed too)")]
    NoNetwork,

    #[error("server rejected the credentials for '{user}': {message}")]
    AuthRejected { user: String, message: String },

    #[error("remote operation failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: ApiError },

    #[error(transparent)]
    BadRecord(#[from] RecordError),
}

/// A record client bound to one authenticated session.
///
/// Owns its session token exclusively; exactly one reconciliation engine
/// or interactive flow drives a client at a time.
#[derive(Debug)]
pub struct RecordClient<A: RecordApi> {
    api: A,
    credentials: Credentials,
    layouts: Layouts,
    server_url: String,
    token: Option<SessionToken>,
    max_attempts: u32,
    /// Re-authentications performed since connect; exposed for tests.
    reauth_count: u32,
}

impl<A: RecordApi> RecordClient<A> {
    /// Authenticate against the server and return a ready client.
    ///
    /// A transport-level failure here is diagnosed by probing: first the
    /// server itself, then a known-reachable endpoint, to distinguish a
    /// downed server from a dead network.
    pub fn connect(
        api: A,
        credentials: Credentials,
        layouts: Layouts,
        server_url: &str,
        max_attempts: u32,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            api,
            credentials,
            layouts,
            server_url: server_url.to_string(),
            token: None,
            max_attempts: max_attempts.max(1),
            reauth_count: 0,
        };
        client.sign_in()?;
        Ok(client)
    }

    fn sign_in(&mut self) -> Result<SessionToken, ClientError> {
        match self
            .api
            .sign_in(&self.credentials.user, &self.credentials.password)
        {
            Ok(token) => {
                self.token = Some(token.clone());
                Ok(token)
            }
            Err(ApiError::Transport(_)) => match self.api.diagnose() {
                Connectivity::NoNetwork => Err(ClientError::NoNetwork),
                Connectivity::ServerUnreachable => Err(ClientError::ServerUnreachable {
                    url: self.server_url.clone(),
                }),
            },
            Err(ApiError::Fault { message, .. }) => Err(ClientError::AuthRejected {
                user: self.credentials.user.clone(),
                message,
            }),
        }
    }

    fn refresh_session(&mut self) -> Result<SessionToken, ClientError> {
        self.token = None;
        self.reauth_count += 1;
        self.sign_in()
    }

    /// Run one remote operation under the retry policy.
    ///
    /// Returns `Ok(None)` for a no-match answer; every other fault either
    /// survives a retry (session refresh included) or exhausts the budget
    /// and comes back as [`ClientError::RetriesExhausted`].
    fn invoke<T>(
        &mut self,
        op: impl Fn(&A, &SessionToken) -> Result<T, ApiError>,
    ) -> Result<Option<T>, ClientError> {
        let mut attempts = 0;
        loop {
            let token = match self.token.clone() {
                Some(token) => token,
                None => self.refresh_session()?,
            };

            let fault = match op(&self.api, &token) {
                Ok(value) => return Ok(Some(value)),
                Err(fault) => fault,
            };

            attempts += 1;
            match fault.kind() {
                FaultKind::NoMatch => {
                    tracing::warn!(fault = %fault, "no records match the request");
                    return Ok(None);
                }
                FaultKind::SessionExpired => {
                    if attempts >= self.max_attempts {
                        return Err(ClientError::RetriesExhausted {
                            attempts,
                            last: fault,
                        });
                    }
                    tracing::debug!(attempt = attempts, "session expired; re-authenticating");
                    self.refresh_session()?;
                }
                FaultKind::Other => {
                    if attempts >= self.max_attempts {
                        return Err(ClientError::RetriesExhausted {
                            attempts,
                            last: fault,
                        });
                    }
                    tracing::debug!(fault = %fault, attempt = attempts, "retrying remote operation");
                }
            }
        }
    }

    /// Find records matching the query; no-match comes back empty.
    pub fn find(
        &mut self,
        layout: &str,
        query: &[QueryGroup],
    ) -> Result<Vec<WireRecord>, ClientError> {
        let layout = layout.to_string();
        Ok(self
            .invoke(|api, token| api.find(token, &layout, query))?
            .unwrap_or_default())
    }

    /// Fetch up to `limit` records, sorted server-side.
    pub fn fetch_page(
        &mut self,
        layout: &str,
        sort: &[SortSpec],
        limit: u32,
    ) -> Result<Vec<WireRecord>, ClientError> {
        let layout = layout.to_string();
        Ok(self
            .invoke(|api, token| api.fetch_page(token, &layout, sort, limit))?
            .unwrap_or_default())
    }

    /// Edit the record behind a session-scoped handle. Returns false when
    /// the server reports no such record instead of applying the edit.
    pub fn edit(
        &mut self,
        layout: &str,
        handle: &str,
        changes: &Map<String, Value>,
    ) -> Result<bool, ClientError> {
        let layout = layout.to_string();
        Ok(self
            .invoke(|api, token| api.edit(token, &layout, handle, changes))?
            .is_some())
    }

    // ---- Domain lookups -------------------------------------------------

    /// Projects whose number field matches the given business key.
    pub fn find_projects_by_number(
        &mut self,
        number: &str,
    ) -> Result<Vec<ProjectRecord>, ClientError> {
        let layout = self.layouts.projects.clone();
        let query = vec![vec![(
            project::fields::NUMBER.to_string(),
            number.to_string(),
        )]];
        self.find(&layout, &query)?
            .into_iter()
            .map(|wire| ProjectRecord::try_from(wire).map_err(ClientError::from))
            .collect()
    }

    /// Projects behind one internal primary key. Used as the verification
    /// lookup before a mutation; callers insist on exactly one row.
    pub fn find_projects_by_id(&mut self, id: i64) -> Result<Vec<ProjectRecord>, ClientError> {
        let layout = self.layouts.projects.clone();
        let query = vec![vec![(project::fields::ID.to_string(), id.to_string())]];
        self.find(&layout, &query)?
            .into_iter()
            .map(|wire| ProjectRecord::try_from(wire).map_err(ClientError::from))
            .collect()
    }

    /// The most recently created projects, newest first.
    pub fn recent_projects(&mut self, limit: u32) -> Result<Vec<ProjectRecord>, ClientError> {
        let layout = self.layouts.projects.clone();
        let sort = vec![SortSpec::descending(project::fields::ID)];
        self.fetch_page(&layout, &sort, limit)?
            .into_iter()
            .map(|wire| ProjectRecord::try_from(wire).map_err(ClientError::from))
            .collect()
    }

    /// People rows behind any of the given internal keys. Historical
    /// duplicates are returned as-is; see [`person::collapse_active`].
    pub fn find_people_by_ids(&mut self, ids: &[i64]) -> Result<Vec<PersonRecord>, ClientError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let layout = self.layouts.people.clone();
        let query: Vec<QueryGroup> = ids
            .iter()
            .map(|id| vec![(person::fields::ID.to_string(), id.to_string())])
            .collect();
        self.find(&layout, &query)?
            .into_iter()
            .map(|wire| PersonRecord::try_from(wire).map_err(ClientError::from))
            .collect()
    }

    /// Apply a field-level edit to one project record.
    pub fn edit_project(
        &mut self,
        handle: &str,
        changes: &Map<String, Value>,
    ) -> Result<bool, ClientError> {
        let layout = self.layouts.projects.clone();
        self.edit(&layout, handle, changes)
    }

    #[cfg(test)]
    pub(crate) fn reauth_count(&self) -> u32 {
        self.reauth_count
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &A {
        &self.api
    }
}
