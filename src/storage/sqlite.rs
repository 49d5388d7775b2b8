//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::contacts::{Confidence, ContactCandidate};
use crate::crawler::DomainOutcome;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ContactRecord, DomainRecord, DomainStatus, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Results =====

    fn record_outcome(&mut self, run_id: i64, outcome: &DomainOutcome) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let (website, status, count, error) = match outcome {
            DomainOutcome::Crawled(result) => {
                let status = if result.is_empty() {
                    DomainStatus::Empty
                } else {
                    DomainStatus::Found
                };
                (result.website.as_str(), status, result.len(), None)
            }
            DomainOutcome::Failed { input, error } => {
                (input.as_str(), DomainStatus::Failed, 0, Some(error.as_str()))
            }
        };

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO domains (run_id, website, status, contact_count, error_message, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![run_id, website, status.to_db_string(), count as i64, error, now],
        )?;
        if inserted == 0 {
            return Err(StorageError::DuplicateDomain {
                run_id,
                website: website.to_string(),
            });
        }

        if let DomainOutcome::Crawled(result) = outcome {
            let mut stmt = tx.prepare(
                "INSERT INTO contacts (run_id, website, email, name, title, source_url, confidence, rank)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (rank, contact) in result.contacts.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    result.website,
                    contact.email,
                    contact.name,
                    contact.title,
                    contact.source_url,
                    contact.confidence.as_str(),
                    rank as i64
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_domains(&self, run_id: i64) -> StorageResult<Vec<DomainRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT website, status, contact_count, error_message FROM domains WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut domains = Vec::new();
        for row in rows {
            let (website, status, contact_count, error_message) = row?;
            let status = DomainStatus::from_db_string(&status).ok_or_else(|| StorageError::Corrupt {
                column: "domains.status".to_string(),
                value: status.clone(),
            })?;
            domains.push(DomainRecord {
                website,
                status,
                contact_count: contact_count as u32,
                error_message,
            });
        }
        Ok(domains)
    }

    fn load_contacts(&self, run_id: i64) -> StorageResult<Vec<ContactRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.website, c.email, c.name, c.title, c.source_url, c.confidence
             FROM contacts c
             JOIN domains d ON d.run_id = c.run_id AND d.website = c.website
             WHERE c.run_id = ?1
             ORDER BY d.id, c.rank",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut contacts = Vec::new();
        for row in rows {
            let (website, email, name, title, source_url, confidence) = row?;
            let confidence = Confidence::from_db_string(&confidence).ok_or_else(|| StorageError::Corrupt {
                column: "contacts.confidence".to_string(),
                value: confidence.clone(),
            })?;
            contacts.push(ContactRecord {
                website,
                contact: ContactCandidate::new(email, name, title, source_url, confidence),
            });
        }
        Ok(contacts)
    }

    fn count_contacts(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
