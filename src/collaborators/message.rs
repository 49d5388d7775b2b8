//! Outbound message templates and the dispatcher contract

use crate::contacts::DomainResult;
use async_trait::async_trait;
use thiserror::Error;

const DEFAULT_SUBJECT: &str = "Inquiry";
const WEBSITE_PLACEHOLDER: &str = "[WebsiteName]";
const SUBJECT_PREFIX: &str = "subject: ";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to send to {recipient}: {message}")]
    Send { recipient: String, message: String },

    #[error("Dispatcher unavailable: {0}")]
    Unavailable(String),
}

/// A subject line and a body with a `[WebsiteName]` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    /// Parses a template file
    ///
    /// The first line is the subject, with an optional `Subject:` prefix
    /// that is removed along with the line. Without the prefix the first
    /// line also stays in the body. A single-line template gets the subject
    /// "Inquiry".
    pub fn parse(raw: &str) -> Self {
        let Some((first, rest)) = raw.split_once('\n') else {
            return Self {
                subject: DEFAULT_SUBJECT.to_string(),
                body: raw.to_string(),
            };
        };

        let first = first.trim_end_matches('\r');
        let prefixed = first
            .get(..SUBJECT_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(SUBJECT_PREFIX));

        if prefixed {
            Self {
                subject: first[SUBJECT_PREFIX.len()..].trim().to_string(),
                body: rest.to_string(),
            }
        } else {
            Self {
                subject: first.to_string(),
                body: raw.to_string(),
            }
        }
    }

    /// The body with every placeholder replaced by `website`
    pub fn render(&self, website: &str) -> String {
        self.body.replace(WEBSITE_PLACEHOLDER, website)
    }
}

/// A rendered message for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMessage {
    /// One message per contact across `results`
    pub fn for_results(results: &[DomainResult], template: &MessageTemplate) -> Vec<Self> {
        results
            .iter()
            .flat_map(|result| {
                let body = template.render(&result.website);
                result.contacts.iter().map(move |contact| Self {
                    recipient: contact.email.clone(),
                    subject: template.subject.clone(),
                    body: body.clone(),
                })
            })
            .collect()
    }
}

/// Sends rendered messages
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn dispatch(&self, message: &OutgoingMessage) -> Result<(), DispatchError>;
}
