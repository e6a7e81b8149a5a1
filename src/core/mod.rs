//! Core module - client, reconciliation, and supporting utilities

pub mod api;
pub mod audit;
pub mod client;
pub mod config;
pub mod fm;
pub mod paths;
pub mod reconcile;
pub mod source;

pub use api::{ApiError, Connectivity, FaultKind, RecordApi, SessionToken, SortSpec, WireRecord};
pub use client::{ClientError, RecordClient, DEFAULT_ATTEMPTS};
pub use config::{Config, ConfigError, Credentials, Layouts};
pub use fm::FmDataApi;
pub use reconcile::{Reconciler, SyncTally};
pub use source::{ArchiveSource, SourceError, SourceRow};
