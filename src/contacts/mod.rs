//! Contact candidates and the heuristics that produce them
//!
//! # Components
//!
//! - `ContactCandidate` / `Confidence`: one email with the name and title found next to it
//! - `ContactAnalyzer`: runs the page-kind heuristics over a fetched page
//! - `NameFinder` / `CapitalizedNameExtractor`: name and title detection in bounded text windows
//! - `ResultAggregator`: per-domain deduplication and ranking

mod aggregate;
mod analyzer;
mod heuristics;
mod names;

pub use aggregate::{DomainResult, ResultAggregator};
pub use analyzer::ContactAnalyzer;
pub use heuristics::PageKind;
pub use names::{find_title, CapitalizedNameExtractor, NameFinder, PersonMention};

use serde::Serialize;
use std::fmt;

/// Coarse reliability label set by the heuristic that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a confidence from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contact found for a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContactCandidate {
    /// Lower-cased email address
    pub email: String,
    /// Person or role name, empty when unknown
    pub name: String,
    /// Job title, empty when unknown
    pub title: String,
    /// Page the contact was found on, or the label of the stream that supplied it
    pub source_url: String,
    pub confidence: Confidence,
}

impl ContactCandidate {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        source_url: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            email: email.into().to_lowercase(),
            name: name.into(),
            title: title.into(),
            source_url: source_url.into(),
            confidence,
        }
    }

    /// A bare email with no name or title
    pub fn email_only(
        email: impl Into<String>,
        source_url: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self::new(email, "", "", source_url, confidence)
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
