//! State module for tracking one domain's crawl
//!
//! # Components
//!
//! - `CrawlPhase`: the per-domain state machine (mode detection, priority scan, halt or general crawl)
//! - `CrawlBudget`: page and contact counters with their configured limits
//! - `VisitedSet`: normalized URLs already fetched or enqueued

mod budget;
mod phase;
mod visited;

pub use budget::CrawlBudget;
pub use phase::CrawlPhase;
pub use visited::VisitedSet;
