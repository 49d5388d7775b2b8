//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sumi-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per input domain per run
CREATE TABLE IF NOT EXISTS domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    website TEXT NOT NULL,
    status TEXT NOT NULL,
    contact_count INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    finished_at TEXT NOT NULL,
    UNIQUE(run_id, website)
);

CREATE INDEX IF NOT EXISTS idx_domains_run ON domains(run_id);

-- Deduplicated contacts, one per email per domain
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    website TEXT NOT NULL,
    email TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    source_url TEXT NOT NULL,
    confidence TEXT NOT NULL,
    rank INTEGER NOT NULL,
    UNIQUE(run_id, website, email)
);

CREATE INDEX IF NOT EXISTS idx_contacts_run ON contacts(run_id);
CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
