//! Crawl engine - per-domain crawl orchestration
//!
//! This module drives one domain through its crawl phases:
//! - Probing the homepage to pick the fetch strategy
//! - Scanning the homepage, guessed contact paths and contact-keyword links
//! - Halting when the priority scan found an email
//! - Otherwise crawling sitemap URLs, or the links collected so far
//! - Forwarding linked documents to the document extractor
//!
//! Every fetch failure is logged and treated as a page that produced nothing.

use crate::collaborators::DocumentTextExtractor;
use crate::config::Config;
use crate::contacts::{Confidence, ContactAnalyzer, ContactCandidate};
use crate::crawler::fetcher::{classify_probe, FetchMode, FetchedPage, PageFetcher, StaticFetcher};
use crate::crawler::parser::{is_document_link, DiscoveredLink, LinkExtractor};
use crate::crawler::renderer::RenderedFetcher;
use crate::crawler::scheduler::{effective_delay, CrawlTask, Discovery, Frontier, PoliteFetcher, PolitenessLimiter};
use crate::crawler::sitemap::SitemapResolver;
use crate::robots::{fetch_robots, ParsedRobots};
use crate::state::{CrawlBudget, CrawlPhase};
use crate::url::Site;
use crate::{FetchError, ParseError, ScoutError};
use futures::stream::{self, FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// What a domain crawl did and found
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub site: Site,
    /// Strategy used for the crawl after mode detection and fallbacks
    pub mode: FetchMode,
    /// Raw candidates in discovery order, not yet deduplicated
    pub contacts: Vec<ContactCandidate>,
    /// Fetches made by the priority scan, homepage probe included
    pub priority_pages: u32,
    /// Fetches charged to the page budget
    pub pages_fetched: u32,
    /// Every page URL dispatched, in dispatch order
    pub fetched_urls: Vec<Url>,
    pub halted_after_priority: bool,
    pub used_sitemap: bool,
    pub phase: CrawlPhase,
}

/// Which part of the crawl a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Links are collected for a later general crawl; no page budget
    Priority,
    /// Sitemap URLs only; links are not followed
    Sitemap,
    /// Breadth-first over discovered links
    General,
}

impl Stage {
    fn is_budgeted(&self) -> bool {
        !matches!(self, Self::Priority)
    }
}

/// Mutable state of one domain crawl, owned by the engine loop
struct DomainCrawl {
    site: Site,
    robots: ParsedRobots,
    extractor: LinkExtractor,
    frontier: Frontier,
    budget: CrawlBudget,
    contacts: Vec<ContactCandidate>,
    collected_links: Vec<DiscoveredLink>,
    documents: Vec<Url>,
    seen_documents: HashSet<String>,
    fetched_urls: Vec<Url>,
}

impl DomainCrawl {
    fn has_email(&self) -> bool {
        self.contacts.iter().any(|c| !c.email.is_empty())
    }
}

/// Crawls one domain at a time; shareable across concurrent domain crawls
pub struct CrawlEngine {
    config: Arc<Config>,
    analyzer: ContactAnalyzer,
    fetcher: Arc<dyn PageFetcher>,
    documents: Option<Arc<dyn DocumentTextExtractor>>,
}

impl CrawlEngine {
    /// Creates an engine with a static HTTP fetcher built from the configuration
    pub fn new(config: Arc<Config>, analyzer: ContactAnalyzer) -> Result<Self, ScoutError> {
        let fetcher = StaticFetcher::new(&config.fetcher)?;
        Ok(Self::with_fetcher(config, analyzer, Arc::new(fetcher)))
    }

    /// Creates an engine around an existing static-mode fetcher
    pub fn with_fetcher(
        config: Arc<Config>,
        analyzer: ContactAnalyzer,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            config,
            analyzer,
            fetcher,
            documents: None,
        }
    }

    /// Forwards document links to `extractor`
    pub fn with_documents(mut self, extractor: Arc<dyn DocumentTextExtractor>) -> Self {
        self.documents = Some(extractor);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls one site through all phases
    ///
    /// Fetch and parse failures never end the crawl early; the returned
    /// error only signals an engine bug (an illegal phase transition).
    pub async fn crawl(&self, site: &Site) -> Result<CrawlReport, ScoutError> {
        let settings = &self.config.crawler;
        let mut phase = CrawlPhase::ModeDetect;
        tracing::info!("Crawling {}", site.host);

        let robots = self.load_robots(site).await;
        let delay = effective_delay(
            settings.politeness_delay(),
            robots.crawl_delay(&self.config.fetcher.user_agent),
        );
        let limiter = Arc::new(PolitenessLimiter::new(delay));
        tracing::debug!("Politeness delay for {}: {:?}", site.host, limiter.delay());
        let static_fetcher: Arc<dyn PageFetcher> =
            Arc::new(PoliteFetcher::new(self.fetcher.clone(), limiter.clone()));

        let mut run = DomainCrawl {
            site: site.clone(),
            robots,
            extractor: LinkExtractor::new(site.clone()),
            frontier: Frontier::new(),
            budget: CrawlBudget::new(settings.max_pages_per_domain, settings.max_contacts_per_domain),
            contacts: Vec::new(),
            collected_links: Vec::new(),
            documents: Vec::new(),
            seen_documents: HashSet::new(),
            fetched_urls: Vec::new(),
        };

        // ModeDetect
        let homepage = site.root.clone();
        let probe = if self.is_allowed(&run, &homepage) {
            run.frontier.mark_visited(&homepage);
            run.budget.record_priority_page();
            run.fetched_urls.push(homepage.clone());
            Some(static_fetcher.fetch(&homepage).await)
        } else {
            tracing::info!("Homepage of {} disallowed by robots.txt", site.host);
            None
        };

        let detected = match &probe {
            Some(Ok(page)) => {
                let extracted = run.extractor.extract(&page.content, &page.content_type, &page.url);
                classify_probe(&page.content, &extracted)
            }
            Some(Err(e)) => {
                tracing::warn!("Homepage probe failed for {}: {}", site.host, e);
                FetchMode::Rendered
            }
            None => FetchMode::Static,
        };

        let renderer = match detected {
            FetchMode::Rendered => self.launch_renderer(site).await,
            FetchMode::Static => None,
        };
        let mode = if renderer.is_some() {
            FetchMode::Rendered
        } else {
            FetchMode::Static
        };
        let page_fetcher: Arc<dyn PageFetcher> = match &renderer {
            Some(rendered) => Arc::new(PoliteFetcher::new(rendered.clone(), limiter.clone())),
            None => static_fetcher.clone(),
        };
        tracing::info!("Fetch mode for {}: {} (probe said {})", site.host, mode, detected);

        // PriorityScan
        phase.transition(CrawlPhase::PriorityScan)?;
        let homepage_links = match (mode, probe) {
            (FetchMode::Static, Some(result)) => self.process(&mut run, homepage.clone(), result, Stage::Priority),
            (FetchMode::Rendered, Some(_)) => {
                run.budget.record_priority_page();
                let result = page_fetcher.fetch(&homepage).await;
                self.process(&mut run, homepage.clone(), result, Stage::Priority)
            }
            (_, None) => Vec::new(),
        };

        for task in self.priority_tasks(site, &homepage, &homepage_links) {
            if self.is_allowed(&run, &task.url) {
                run.frontier.push(task);
            } else {
                tracing::debug!("Skipping {} (robots.txt)", task.url);
            }
        }
        self.drain(&mut run, &page_fetcher, Stage::Priority).await;

        let halted = settings.halt_on_priority_contact && run.has_email();
        let mut used_sitemap = false;

        if halted {
            phase.transition(CrawlPhase::Halted)?;
            tracing::info!(
                "Priority scan of {} found {} contact(s); halting",
                site.host,
                run.contacts.len()
            );
        } else if run.budget.contacts_exhausted() {
            phase.transition(CrawlPhase::Halted)?;
            tracing::info!(
                "Contact threshold exceeded for {} during priority scan ({} found); skipping sitemap",
                site.host,
                run.budget.contact_count()
            );
        } else {
            phase.transition(CrawlPhase::SitemapOrGeneralCrawl)?;

            let sitemap_urls: Vec<Url> = SitemapResolver::new(static_fetcher.clone())
                .resolve_with(site, &run.robots)
                .await
                .into_iter()
                .filter(|url| site.contains(url))
                .collect();

            let stage = if sitemap_urls.is_empty() {
                tracing::info!("No sitemap URLs for {}; following links", site.host);
                for link in std::mem::take(&mut run.collected_links) {
                    self.enqueue(&mut run, link.url, None, Discovery::Link);
                }
                Stage::General
            } else {
                used_sitemap = true;
                for url in sitemap_urls {
                    self.enqueue(&mut run, url, None, Discovery::Sitemap);
                }
                Stage::Sitemap
            };

            self.drain(&mut run, &page_fetcher, stage).await;
        }

        self.extract_documents(&mut run).await;

        if let Some(rendered) = renderer {
            drop(page_fetcher);
            match Arc::try_unwrap(rendered) {
                Ok(rendered) => rendered.shutdown().await,
                Err(_) => tracing::debug!("Renderer still shared; dropping without shutdown"),
            }
        }

        phase.transition(CrawlPhase::Done)?;
        tracing::info!(
            "Finished {}: {} page(s) ({} priority), {} URL(s) seen, {} candidate(s)",
            site.host,
            run.budget.total_pages(),
            run.budget.priority_pages(),
            run.frontier.visited_count(),
            run.contacts.len()
        );

        Ok(CrawlReport {
            site: run.site,
            mode,
            contacts: run.contacts,
            priority_pages: run.budget.priority_pages(),
            pages_fetched: run.budget.pages_fetched(),
            fetched_urls: run.fetched_urls,
            halted_after_priority: halted,
            used_sitemap,
            phase,
        })
    }

    async fn load_robots(&self, site: &Site) -> ParsedRobots {
        if !self.config.crawler.respect_robots_txt {
            return ParsedRobots::allow_all();
        }
        match fetch_robots(self.fetcher.as_ref(), site).await {
            Ok(robots) => robots,
            Err(e) => {
                tracing::warn!("{}; treating as allow-all", e);
                ParsedRobots::allow_all()
            }
        }
    }

    async fn launch_renderer(&self, site: &Site) -> Option<Arc<RenderedFetcher>> {
        if !self.config.fetcher.enable_rendering {
            tracing::debug!("Rendering disabled; crawling {} statically", site.host);
            return None;
        }
        match RenderedFetcher::launch(&self.config.fetcher, self.config.crawler.max_concurrent_renders).await {
            Ok(fetcher) => Some(Arc::new(fetcher)),
            Err(e) => {
                tracing::warn!("{}; crawling {} statically", e, site.host);
                None
            }
        }
    }

    fn is_allowed(&self, run: &DomainCrawl, url: &Url) -> bool {
        !self.config.crawler.respect_robots_txt
            || run.robots.is_allowed(url.as_str(), &self.config.fetcher.user_agent)
    }

    /// Guessed contact paths, then homepage links matching a contact keyword
    fn priority_tasks(&self, site: &Site, homepage: &Url, links: &[DiscoveredLink]) -> Vec<CrawlTask> {
        let settings = &self.config.crawler;
        let mut tasks: Vec<CrawlTask> = settings
            .priority_paths
            .iter()
            .filter_map(|path| site.join(path).ok())
            .map(|url| CrawlTask::new(url, Some(homepage.clone()), Discovery::PriorityPath))
            .collect();

        let keywords: Vec<String> = settings
            .priority_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        tasks.extend(
            links
                .iter()
                .filter(|link| {
                    let href = link.url.as_str().to_lowercase();
                    let text = link.anchor_text.to_lowercase();
                    keywords.iter().any(|k| href.contains(k.as_str()) || text.contains(k.as_str()))
                })
                .take(settings.max_priority_links as usize)
                .map(|link| CrawlTask::new(link.url.clone(), Some(homepage.clone()), Discovery::PriorityLink)),
        );
        tasks
    }

    /// Enqueues a same-site URL that robots.txt allows
    ///
    /// Document URLs are never fetched as pages; they go to the document list.
    fn enqueue(&self, run: &mut DomainCrawl, url: Url, origin: Option<Url>, via: Discovery) {
        if !run.site.contains(&url) {
            return;
        }
        if is_document_link(&url) {
            if run.seen_documents.insert(url.to_string()) {
                tracing::debug!("Forwarding document {} ({:?})", url, via);
                run.documents.push(url);
            }
            return;
        }
        if !self.is_allowed(run, &url) {
            tracing::debug!("Skipping {} (robots.txt)", url);
            return;
        }
        run.frontier.push(CrawlTask::new(url, origin, via));
    }

    /// Fetches queued tasks until the frontier is empty or a budget runs out
    ///
    /// Up to `max-concurrent-fetches` requests are in flight. Reaching the page
    /// cap stops dispatching and lets in-flight fetches finish; exceeding the
    /// contact threshold abandons them.
    async fn drain(&self, run: &mut DomainCrawl, fetcher: &Arc<dyn PageFetcher>, stage: Stage) {
        let max_in_flight = self.config.crawler.max_concurrent_fetches.max(1) as usize;
        let mut in_flight = FuturesUnordered::new();

        loop {
            if run.budget.contacts_exhausted() {
                tracing::info!(
                    "Contact threshold exceeded for {} ({} found); abandoning {} fetch(es)",
                    run.site.host,
                    run.budget.contact_count(),
                    in_flight.len()
                );
                run.frontier.clear();
                break;
            }

            while in_flight.len() < max_in_flight {
                if stage.is_budgeted() && run.budget.pages_exhausted() {
                    if !run.frontier.is_empty() {
                        tracing::info!(
                            "Page budget reached for {}; {} URL(s) left unvisited",
                            run.site.host,
                            run.frontier.len()
                        );
                        run.frontier.clear();
                    }
                    break;
                }
                let Some(task) = run.frontier.pop() else {
                    break;
                };

                if stage.is_budgeted() {
                    run.budget.record_page();
                } else {
                    run.budget.record_priority_page();
                }
                run.fetched_urls.push(task.url.clone());
                tracing::debug!("Fetching {} ({:?})", task.url, task.discovered_via);

                let fetcher = fetcher.clone();
                in_flight.push(async move {
                    let result = fetcher.fetch(&task.url).await;
                    (task, result)
                });
            }

            let Some((task, result)) = in_flight.next().await else {
                break;
            };
            let origin = task.url.clone();
            let links = self.process(run, task.url, result, stage);

            if stage == Stage::General {
                for link in links {
                    self.enqueue(run, link.url, Some(origin.clone()), Discovery::Link);
                }
            }
        }
    }

    /// Extracts contacts and links from one fetch result
    ///
    /// Returns the page's internal links. Priority pages also add them to the
    /// collected links for a later general crawl.
    fn process(
        &self,
        run: &mut DomainCrawl,
        requested: Url,
        result: Result<FetchedPage, FetchError>,
        stage: Stage,
    ) -> Vec<DiscoveredLink> {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                log_fetch_error(&run.site, &e);
                return Vec::new();
            }
        };

        if page.url != requested {
            run.frontier.mark_visited(&page.url);
        }

        if page.is_html() && page.content.trim().is_empty() {
            let error = ParseError::Html {
                url: page.url.to_string(),
                message: "empty document".to_string(),
            };
            tracing::debug!("{}", error);
            return Vec::new();
        }

        let extracted = run.extractor.extract(&page.content, &page.content_type, &page.url);
        let contacts = if page.is_html() {
            self.analyzer.analyze(&page.content, &page.url)
        } else {
            extracted
                .emails
                .iter()
                .map(|email| ContactCandidate::email_only(email, page.url.as_str(), Confidence::Low))
                .collect()
        };

        let new = run.budget.record_contacts(contacts.iter().map(|c| c.email.as_str()));
        if !contacts.is_empty() {
            tracing::debug!("{} candidate(s), {} new email(s) on {}", contacts.len(), new, page.url);
        }
        run.contacts.extend(contacts);

        for document in extracted.document_links {
            if run.seen_documents.insert(document.to_string()) {
                run.documents.push(document);
            }
        }

        if stage == Stage::Priority {
            run.collected_links.extend(extracted.page_links.iter().cloned());
        }
        extracted.page_links
    }

    /// Sends every collected document link to the document extractor once
    async fn extract_documents(&self, run: &mut DomainCrawl) {
        let documents = std::mem::take(&mut run.documents);
        let Some(extractor) = &self.documents else {
            if !documents.is_empty() {
                tracing::debug!("{} document link(s) on {} not extracted", documents.len(), run.site.host);
            }
            return;
        };

        let limit = self.config.crawler.max_concurrent_fetches.max(1) as usize;
        let found: Vec<Vec<ContactCandidate>> = stream::iter(documents)
            .map(|url| {
                let extractor = extractor.clone();
                async move {
                    tracing::debug!("Extracting document {}", url);
                    extractor.extract(&url).await.into_contacts(url.as_str())
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        for contacts in found {
            run.budget.record_contacts(contacts.iter().map(|c| c.email.as_str()));
            run.contacts.extend(contacts);
        }
    }
}

fn log_fetch_error(site: &Site, error: &FetchError) {
    match error {
        e if e.is_not_found() => tracing::debug!("Not found: {}", e.url()),
        FetchError::Status { .. } => tracing::warn!("{} ({})", error, site.host),
        FetchError::Timeout { .. } => tracing::warn!("{} ({})", error, site.host),
        FetchError::Unsupported { .. } => tracing::debug!("{}", error),
        FetchError::Http { .. } | FetchError::Browser { .. } => {
            tracing::warn!("{} ({})", error, site.host)
        }
    }
}
