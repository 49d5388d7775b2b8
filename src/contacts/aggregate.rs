//! Per-domain deduplication and ranking of contact candidates

use crate::contacts::ContactCandidate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// The final contacts for one domain
///
/// An empty contact list is a normal result: the domain was crawled and
/// nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainResult {
    /// The domain as it was given to the harvester
    pub website: String,
    /// At most one candidate per email, best first
    pub contacts: Vec<ContactCandidate>,
}

impl DomainResult {
    pub fn empty(website: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            contacts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn find(&self, email: &str) -> Option<&ContactCandidate> {
        let key = email.to_lowercase();
        self.contacts.iter().find(|c| c.email == key)
    }
}

/// Merges raw candidate streams into a `DomainResult`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Deduplicates `raw` by email, keeping the best candidate of each
    ///
    /// Between two candidates for the same email the higher confidence wins;
    /// on equal confidence a named candidate beats an unnamed one, then the
    /// longer name wins, and otherwise the earlier candidate is kept. Results
    /// are ordered by confidence, named before unnamed, then email.
    /// Candidates with an empty email are dropped.
    pub fn aggregate<I>(&self, website: &str, raw: I) -> DomainResult
    where
        I: IntoIterator<Item = ContactCandidate>,
    {
        let mut best: HashMap<String, ContactCandidate> = HashMap::new();

        for mut candidate in raw {
            let key = candidate.email.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            candidate.email = key.clone();

            match best.get_mut(&key) {
                Some(current) => {
                    if preference(&candidate, current) == Ordering::Greater {
                        *current = candidate;
                    }
                }
                None => {
                    best.insert(key, candidate);
                }
            }
        }

        let mut contacts: Vec<ContactCandidate> = best.into_values().collect();
        contacts.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| b.has_name().cmp(&a.has_name()))
                .then_with(|| a.email.cmp(&b.email))
        });

        DomainResult {
            website: website.to_string(),
            contacts,
        }
    }
}

/// Orders two candidates for the same email by merge preference
fn preference(a: &ContactCandidate, b: &ContactCandidate) -> Ordering {
    a.confidence
        .cmp(&b.confidence)
        .then_with(|| a.has_name().cmp(&b.has_name()))
        .then_with(|| a.name.trim().len().cmp(&b.name.trim().len()))
}
