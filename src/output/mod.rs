//! Output module for exporting harvested contacts
//!
//! This module handles:
//! - Flattening domain results into one export record per contact
//! - Rendering those records as a markdown summary table

mod markdown;

pub use markdown::{format_markdown_summary, write_markdown_summary};

use crate::crawler::DomainOutcome;
use crate::storage::{DomainStatus, Storage, StorageError};
use serde::Serialize;
use thiserror::Error;

/// Placeholder written for a domain crawled without finding any contact
pub const NO_EMAIL_FOUND: &str = "No email found";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "Website")]
    pub website: String,

    #[serde(rename = "Found_Email")]
    pub found_email: String,

    #[serde(rename = "Found_Name")]
    pub found_name: String,

    #[serde(rename = "Source_URL")]
    pub source_url: String,
}

impl ExportRecord {
    fn nothing_found(website: &str) -> Self {
        Self {
            website: website.to_string(),
            found_email: NO_EMAIL_FOUND.to_string(),
            found_name: String::new(),
            source_url: String::new(),
        }
    }

    /// Whether this row stands for a domain without contacts
    pub fn is_placeholder(&self) -> bool {
        self.found_email == NO_EMAIL_FOUND
    }
}

/// Flattens harvest outcomes into export rows
///
/// Each crawled domain yields one row per contact in ranked order, or a
/// single placeholder row when nothing was found. Failed domains yield no row.
pub fn export_records(outcomes: &[DomainOutcome]) -> Vec<ExportRecord> {
    let mut records = Vec::new();

    for result in outcomes.iter().filter_map(DomainOutcome::result) {
        if result.is_empty() {
            records.push(ExportRecord::nothing_found(&result.website));
            continue;
        }
        records.extend(result.contacts.iter().map(|c| ExportRecord {
            website: result.website.clone(),
            found_email: c.email.clone(),
            found_name: c.name.clone(),
            source_url: c.source_url.clone(),
        }));
    }

    records
}

/// Rebuilds the export rows of a stored run
pub fn records_from_storage(storage: &dyn Storage, run_id: i64) -> OutputResult<Vec<ExportRecord>> {
    let contacts = storage.load_contacts(run_id)?;
    let mut records = Vec::new();

    for domain in storage.load_domains(run_id)? {
        match domain.status {
            DomainStatus::Failed => {}
            DomainStatus::Empty => records.push(ExportRecord::nothing_found(&domain.website)),
            DomainStatus::Found => records.extend(
                contacts
                    .iter()
                    .filter(|record| record.website == domain.website)
                    .map(|record| ExportRecord {
                        website: record.website.clone(),
                        found_email: record.contact.email.clone(),
                        found_name: record.contact.name.clone(),
                        source_url: record.contact.source_url.clone(),
                    }),
            ),
        }
    }

    Ok(records)
}
