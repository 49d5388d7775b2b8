//! Storage module for persisting harvest results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking
//! - Per-domain outcomes and their deduplicated contacts

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::contacts::ContactCandidate;
use std::path::Path;

/// Opens or creates a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// How a domain's harvest ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    /// Crawled, at least one contact
    Found,
    /// Crawled, nothing found
    Empty,
    /// Not crawled
    Failed,
}

impl DomainStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "found" => Some(Self::Found),
            "empty" => Some(Self::Empty),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A recorded domain outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub website: String,
    pub status: DomainStatus,
    pub contact_count: u32,
    pub error_message: Option<String>,
}

/// A recorded contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub website: String,
    pub contact: ContactCandidate,
}
