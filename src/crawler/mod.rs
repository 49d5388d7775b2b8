//! Crawler module for contact discovery
//!
//! This module contains the core crawling logic, including:
//! - Static and rendered page fetching
//! - HTML parsing, link and email extraction
//! - Sitemap resolution
//! - Frontier scheduling and per-domain politeness
//! - The per-domain crawl engine and the multi-domain harvester

mod coordinator;
mod fetcher;
mod harvester;
mod parser;
mod renderer;
mod scheduler;
mod sitemap;

pub use coordinator::{CrawlEngine, CrawlReport};
pub use fetcher::{build_http_client, classify_probe, FetchMode, FetchedPage, PageFetcher, StaticFetcher, TlsPolicy};
pub use harvester::{ContactHarvester, DomainOutcome, ENRICHMENT_SOURCE, WHOIS_SOURCE};
pub use parser::{element_text, is_document_link, visible_text, DiscoveredLink, ExtractedPage, LinkExtractor};
pub use renderer::RenderedFetcher;
pub use scheduler::{effective_delay, CrawlTask, Discovery, Frontier, PoliteFetcher, PolitenessLimiter, MAX_CRAWL_DELAY};
pub use sitemap::{parse_sitemap, SitemapDocument, SitemapResolver, DEFAULT_MAX_SITEMAPS};

use crate::config::Config;
use crate::contacts::{CapitalizedNameExtractor, ContactAnalyzer};
use crate::output::write_markdown_summary;
use crate::storage::{open_storage, Storage, StorageError};
use crate::ScoutError;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete harvest over `inputs`
///
/// This is the main entry point. It will:
/// 1. Build the crawl engine with the regex name extractor
/// 2. Crawl every input domain concurrently
/// 3. Record the outcomes in SQLite when `database-path` is set
/// 4. Write the markdown summary when `summary-path` is set
///
/// Per-domain failures are part of the returned outcomes; only setup and
/// output failures are errors.
pub async fn harvest(config: Config, config_hash: &str, inputs: &[String]) -> Result<Vec<DomainOutcome>, ScoutError> {
    let config = Arc::new(config);
    let analyzer = ContactAnalyzer::new(Some(Arc::new(CapitalizedNameExtractor)));
    let engine = CrawlEngine::new(config.clone(), analyzer)?;

    tracing::info!("Harvesting {} domain(s)", inputs.len());
    let outcomes = ContactHarvester::new(engine).harvest(inputs).await;

    if let Some(path) = &config.output.database_path {
        let mut storage = open_storage(Path::new(path))?;
        let run_id = storage.create_run(config_hash)?;
        for outcome in &outcomes {
            match storage.record_outcome(run_id, outcome) {
                Err(StorageError::DuplicateDomain { website, .. }) => {
                    tracing::warn!("{} was given more than once; keeping the first result", website);
                }
                other => other?,
            }
        }
        storage.complete_run(run_id)?;
        tracing::info!("Recorded run {} in {}", run_id, path);
    }

    if let Some(path) = &config.output.summary_path {
        write_markdown_summary(&outcomes, Path::new(path))?;
        tracing::info!("Summary written to {}", path);
    }

    Ok(outcomes)
}
