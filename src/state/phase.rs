//! Phase definitions for one domain's crawl
use crate::ScoutError;
use std::fmt;

/// The phase a domain crawl is in
///
/// `ModeDetect → PriorityScan → (Halted | SitemapOrGeneralCrawl) → Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Probing the homepage to pick a fetch strategy
    ModeDetect,

    /// Fetching the homepage, guessed contact paths and keyword links
    PriorityScan,

    /// Priority pages produced an email; nothing else is crawled
    Halted,

    /// Crawling sitemap URLs, or links collected during the priority scan
    SitemapOrGeneralCrawl,

    /// The domain crawl is over
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::ModeDetect, Self::PriorityScan)
                | (Self::PriorityScan, Self::Halted)
                | (Self::PriorityScan, Self::SitemapOrGeneralCrawl)
                | (Self::Halted, Self::Done)
                | (Self::SitemapOrGeneralCrawl, Self::Done)
        )
    }

    /// Moves to `next`, rejecting illegal steps
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), ScoutError> {
        if !self.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    /// Returns true once no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModeDetect => "mode_detect",
            Self::PriorityScan => "priority_scan",
            Self::Halted => "halted",
            Self::SitemapOrGeneralCrawl => "sitemap_or_general_crawl",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
