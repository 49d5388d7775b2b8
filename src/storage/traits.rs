//! Storage traits and error types

use crate::crawler::DomainOutcome;
use crate::storage::{ContactRecord, DomainRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Domain {website} already recorded for run {run_id}")]
    DuplicateDomain { run_id: i64, website: String },

    #[error("Corrupt value in column {column}: {value}")]
    Corrupt { column: String, value: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence of harvest runs and their results
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Results =====

    /// Records one domain's outcome and, for crawled domains, its contacts
    ///
    /// Contacts keep the order of the `DomainResult`.
    fn record_outcome(&mut self, run_id: i64, outcome: &DomainOutcome) -> StorageResult<()>;

    /// Domains of a run, in the order they were recorded
    fn load_domains(&self, run_id: i64) -> StorageResult<Vec<DomainRecord>>;

    /// Contacts of a run, grouped by domain in recording order
    fn load_contacts(&self, run_id: i64) -> StorageResult<Vec<ContactRecord>>;

    fn count_contacts(&self, run_id: i64) -> StorageResult<u64>;
}
