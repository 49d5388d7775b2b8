//! Contracts for the services a harvest depends on but does not implement
//!
//! Document text extraction, person-name recognition, domain registration
//! lookups, third-party enrichment and outbound messaging all live behind the
//! traits in this module. The crawl only sees these interfaces.

pub mod enrichment;
pub mod message;

use crate::contacts::{Confidence, ContactCandidate, PersonMention};
use async_trait::async_trait;
use url::Url;

pub use enrichment::{search_with_rotation, ApiKeyRing, EnrichedContact, EnrichmentError};
pub use message::{DispatchError, MessageDispatcher, MessageTemplate, OutgoingMessage};

/// Finds person names (and titles, when known) in a short text window
///
/// Implementations are called with windows of at most a few hundred
/// characters and must be safe to share across crawls.
pub trait NameEntityExtractor: Send + Sync {
    fn extract_persons(&self, text: &str) -> Vec<PersonMention>;
}

/// Text pulled out of a linked document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    pub emails: Vec<String>,
    pub names: Vec<String>,
}

impl DocumentText {
    /// Contacts found in a document
    ///
    /// Every email becomes a low-confidence, unnamed contact. A document with
    /// a single email and at least one name binds the first name to it.
    pub fn into_contacts(self, source_url: &str) -> Vec<ContactCandidate> {
        let name = match (self.emails.len(), self.names.first()) {
            (1, Some(name)) => name.trim().to_string(),
            _ => String::new(),
        };

        self.emails
            .iter()
            .map(|email| ContactCandidate::new(email, &name, "", source_url, Confidence::Low))
            .collect()
    }
}

/// Downloads a document (PDF, DOCX, PPTX) and returns the text it carries
///
/// Unsupported formats return an empty `DocumentText`.
#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    async fn extract(&self, document: &Url) -> DocumentText;
}

/// Looks up contacts in a domain's registration records
#[async_trait]
pub trait DomainRegistrationLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Vec<ContactCandidate>;
}

/// A third-party domain search service
#[async_trait]
pub trait ContactEnrichmentApi: Send + Sync {
    async fn search(&self, domain: &str, api_key: &str) -> Result<Vec<EnrichedContact>, EnrichmentError>;
}
