//! Sitemap resolution
//!
//! Sitemap locations come from robots.txt `Sitemap:` directives, falling back
//! to `/sitemap.xml`. Sitemap indexes are followed iteratively; a visited set
//! guarantees each sitemap is fetched and parsed at most once, which also
//! terminates cyclic indexes.

use crate::crawler::fetcher::PageFetcher;
use crate::robots::{fetch_robots, ParsedRobots};
use crate::state::VisitedSet;
use crate::url::Site;
use crate::{ParseError, ResolutionError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Arc;
use url::Url;

static LOC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").unwrap());

/// Default cap on sitemap files fetched per site
pub const DEFAULT_MAX_SITEMAPS: usize = 50;

/// A parsed sitemap file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of further sitemaps
    Index(Vec<Url>),
    /// `<urlset>`: page locations
    UrlSet(Vec<Url>),
}

/// Parses a sitemap or sitemap index
///
/// Relative `<loc>` values are resolved against the sitemap's own URL;
/// values that do not parse are skipped.
///
/// # Errors
///
/// Returns `ParseError::Xml` when the content has neither a `<urlset>` nor a
/// `<sitemapindex>` root.
pub fn parse_sitemap(content: &str, sitemap_url: &Url) -> Result<SitemapDocument, ParseError> {
    let lower = content.to_ascii_lowercase();
    let is_index = lower.contains("<sitemapindex");
    if !is_index && !lower.contains("<urlset") {
        return Err(ParseError::Xml {
            url: sitemap_url.to_string(),
            message: "no <urlset> or <sitemapindex> element".to_string(),
        });
    }

    let locations: Vec<Url> = LOC_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| unwrap_cdata(m.as_str()))
        .map(|raw| html_escape::decode_html_entities(raw).into_owned())
        .filter(|loc| !loc.is_empty())
        .filter_map(|loc| sitemap_url.join(&loc).ok())
        .collect();

    if is_index {
        Ok(SitemapDocument::Index(locations))
    } else {
        Ok(SitemapDocument::UrlSet(locations))
    }
}

fn unwrap_cdata(raw: &str) -> &str {
    raw.trim()
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .map(str::trim)
        .unwrap_or_else(|| raw.trim())
}

/// Resolves a site's sitemaps into a flat list of page URLs
pub struct SitemapResolver {
    fetcher: Arc<dyn PageFetcher>,
    max_sitemaps: usize,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_sitemaps: DEFAULT_MAX_SITEMAPS,
        }
    }

    pub fn with_max_sitemaps(mut self, max_sitemaps: usize) -> Self {
        self.max_sitemaps = max_sitemaps.max(1);
        self
    }

    /// Fetches robots.txt and resolves every sitemap it points to
    pub async fn resolve(&self, site: &Site) -> Vec<Url> {
        let robots = match fetch_robots(self.fetcher.as_ref(), site).await {
            Ok(robots) => robots,
            Err(e) => {
                tracing::warn!("{}; falling back to /sitemap.xml", e);
                ParsedRobots::allow_all()
            }
        };
        self.resolve_with(site, &robots).await
    }

    /// Resolves sitemaps using already fetched robots.txt rules
    ///
    /// Returns page URLs in discovery order, without duplicates. Sitemaps that
    /// fail to fetch or parse are skipped.
    pub async fn resolve_with(&self, site: &Site, robots: &ParsedRobots) -> Vec<Url> {
        let mut queue: VecDeque<Url> = robots
            .sitemaps()
            .iter()
            .filter_map(|target| site.join(target).ok())
            .collect();

        if queue.is_empty() {
            if let Ok(default) = site.join("/sitemap.xml") {
                queue.push_back(default);
            }
        }

        let mut parsed = VisitedSet::new();
        let mut seen_pages = VisitedSet::new();
        let mut pages: Vec<Url> = Vec::new();

        while let Some(sitemap_url) = queue.pop_front() {
            if parsed.len() >= self.max_sitemaps {
                tracing::warn!(
                    "Sitemap limit ({}) reached for {}; {} sitemaps left unread",
                    self.max_sitemaps,
                    site.host,
                    queue.len() + 1
                );
                break;
            }

            if !parsed.insert(&sitemap_url) {
                continue;
            }

            let page = match self.fetcher.fetch(&sitemap_url).await {
                Ok(page) => page,
                Err(source) => {
                    let error = ResolutionError::Sitemap {
                        url: sitemap_url.to_string(),
                        source,
                    };
                    tracing::debug!("Skipping sitemap: {}", error);
                    continue;
                }
            };

            match parse_sitemap(&page.content, &sitemap_url) {
                Ok(SitemapDocument::Index(children)) => {
                    tracing::debug!(
                        "Sitemap index {} lists {} sitemaps",
                        sitemap_url,
                        children.len()
                    );
                    queue.extend(children.into_iter().filter(|c| !parsed.contains(c)));
                }
                Ok(SitemapDocument::UrlSet(urls)) => {
                    tracing::debug!("Sitemap {} lists {} pages", sitemap_url, urls.len());
                    pages.extend(urls.into_iter().filter(|u| seen_pages.insert(u)));
                }
                Err(e) => {
                    let error = ResolutionError::from(e);
                    tracing::debug!("Skipping sitemap: {}", error);
                }
            }
        }

        tracing::info!(
            "Resolved {} sitemap URLs for {} from {} sitemaps",
            pages.len(),
            site.host,
            parsed.len()
        );
        pages
    }
}
