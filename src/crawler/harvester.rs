//! Multi-domain harvesting
//!
//! Each input domain is crawled in its own task, bounded by
//! `max-concurrent-domains`. A failure or panic in one domain's task is
//! reported for that domain only.

use crate::collaborators::{search_with_rotation, ApiKeyRing, ContactEnrichmentApi, DomainRegistrationLookup};
use crate::contacts::{ContactCandidate, DomainResult, ResultAggregator};
use crate::crawler::coordinator::CrawlEngine;
use crate::url::Site;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Source label for registration-record contacts
pub const WHOIS_SOURCE: &str = "WHOIS";

/// Source label for enrichment-service contacts
pub const ENRICHMENT_SOURCE: &str = "ENRICHMENT";

/// The result of harvesting one input domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// The domain was crawled; its result may be empty
    Crawled(DomainResult),
    /// The domain could not be crawled at all
    Failed { input: String, error: String },
}

impl DomainOutcome {
    pub fn input(&self) -> &str {
        match self {
            Self::Crawled(result) => &result.website,
            Self::Failed { input, .. } => input,
        }
    }

    pub fn result(&self) -> Option<&DomainResult> {
        match self {
            Self::Crawled(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

/// Crawls many domains and merges every contact stream per domain
pub struct ContactHarvester {
    engine: Arc<CrawlEngine>,
    aggregator: ResultAggregator,
    registration: Option<Arc<dyn DomainRegistrationLookup>>,
    enrichment: Option<(Arc<dyn ContactEnrichmentApi>, Arc<ApiKeyRing>)>,
    max_concurrent_domains: usize,
}

impl ContactHarvester {
    pub fn new(engine: CrawlEngine) -> Self {
        let max_concurrent_domains = engine.config().crawler.max_concurrent_domains.max(1) as usize;
        Self {
            engine: Arc::new(engine),
            aggregator: ResultAggregator::new(),
            registration: None,
            enrichment: None,
            max_concurrent_domains,
        }
    }

    /// Adds registration-record contacts to every domain
    pub fn with_registration_lookup(mut self, lookup: Arc<dyn DomainRegistrationLookup>) -> Self {
        self.registration = Some(lookup);
        self
    }

    /// Adds enrichment-service contacts to every domain
    pub fn with_enrichment(mut self, api: Arc<dyn ContactEnrichmentApi>, keys: Arc<ApiKeyRing>) -> Self {
        self.enrichment = Some((api, keys));
        self
    }

    /// Harvests every input, returning one outcome per input in input order
    pub async fn harvest(&self, inputs: &[String]) -> Vec<DomainOutcome> {
        let permits = Arc::new(Semaphore::new(self.max_concurrent_domains));
        let mut handles = Vec::with_capacity(inputs.len());

        for input in inputs {
            let site = match Site::parse(input) {
                Ok(site) => site,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", input, e);
                    handles.push((input.clone(), None));
                    continue;
                }
            };

            let permits = permits.clone();
            let engine = self.engine.clone();
            let registration = self.registration.clone();
            let enrichment = self.enrichment.clone();
            let aggregator = self.aggregator;

            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                harvest_site(&engine, &site, registration, enrichment, aggregator).await
            });
            handles.push((input.clone(), Some(handle)));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (input, handle) in handles {
            let outcome = match handle {
                None => DomainOutcome::Failed {
                    error: format!("invalid website: {}", input),
                    input,
                },
                Some(handle) => match handle.await {
                    Ok(Ok(result)) => DomainOutcome::Crawled(result),
                    Ok(Err(error)) => {
                        tracing::error!("Crawl of {} failed: {}", input, error);
                        DomainOutcome::Failed { input, error }
                    }
                    Err(join_error) => {
                        tracing::error!("Crawl task for {} aborted: {}", input, join_error);
                        DomainOutcome::Failed {
                            input,
                            error: join_error.to_string(),
                        }
                    }
                },
            };
            outcomes.push(outcome);
        }

        let found = outcomes.iter().filter_map(DomainOutcome::result).filter(|r| !r.is_empty()).count();
        tracing::info!("Harvest finished: {} of {} domain(s) with contacts", found, outcomes.len());
        outcomes
    }
}

async fn harvest_site(
    engine: &CrawlEngine,
    site: &Site,
    registration: Option<Arc<dyn DomainRegistrationLookup>>,
    enrichment: Option<(Arc<dyn ContactEnrichmentApi>, Arc<ApiKeyRing>)>,
    aggregator: ResultAggregator,
) -> Result<DomainResult, String> {
    let report = engine.crawl(site).await.map_err(|e| e.to_string())?;
    let mut contacts: Vec<ContactCandidate> = report.contacts;

    if let Some(lookup) = registration {
        let found = lookup.lookup(&site.registrable).await;
        tracing::debug!("{} registration contact(s) for {}", found.len(), site.registrable);
        contacts.extend(found.into_iter().map(|mut c| {
            c.source_url = WHOIS_SOURCE.to_string();
            c
        }));
    }

    if let Some((api, keys)) = enrichment {
        let found = search_with_rotation(api.as_ref(), &keys, &site.registrable).await;
        tracing::debug!("{} enrichment contact(s) for {}", found.len(), site.registrable);
        contacts.extend(found.into_iter().map(|c| c.into_candidate(ENRICHMENT_SOURCE)));
    }

    let result = aggregator.aggregate(&site.input, contacts);
    if result.is_empty() {
        tracing::info!("No contacts found for {}", site.input);
    }
    Ok(result)
}
