//! Frontier and politeness control for one domain's crawl
//!
//! This module handles:
//! - The FIFO work queue (`Frontier`)
//! - Enqueue-time deduplication through the visited set
//! - The per-domain token bucket spacing out requests
//! - Integrating robots.txt crawl delays

use crate::crawler::fetcher::{FetchMode, FetchedPage, PageFetcher};
use crate::state::VisitedSet;
use crate::FetchError;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Upper bound applied to robots.txt `Crawl-delay`
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(30);

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// How a URL entered the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discovery {
    /// A configured contact-oriented path
    PriorityPath,
    /// A homepage link matching a contact keyword
    PriorityLink,
    /// A `<loc>` entry of the site's sitemap
    Sitemap,
    /// A link found on a crawled page
    Link,
}

/// One unit of frontier work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    /// Page the URL was found on, if any
    pub origin: Option<Url>,
    pub discovered_via: Discovery,
}

impl CrawlTask {
    pub fn new(url: Url, origin: Option<Url>, discovered_via: Discovery) -> Self {
        Self {
            url,
            origin,
            discovered_via,
        }
    }
}

/// FIFO work queue of one domain's crawl
///
/// A URL is recorded as visited in the same call that enqueues it, so no URL
/// is ever enqueued twice.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    visited: VisitedSet,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task unless its URL was seen before
    pub fn push(&mut self, task: CrawlTask) -> bool {
        if !self.visited.insert(&task.url) {
            return false;
        }
        self.queue.push_back(task);
        true
    }

    /// Records a URL fetched outside the queue
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url)
    }

    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    /// Drops every queued task, keeping the visited set
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// URLs enqueued or fetched so far, queued ones included
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Calculates the effective delay between requests to one domain
///
/// The larger of the configured delay and the robots.txt crawl delay
/// (capped at `MAX_CRAWL_DELAY`) wins.
///
/// # Arguments
///
/// * `configured` - The configured politeness delay
/// * `crawl_delay_secs` - Crawl-delay from robots.txt, if any
pub fn effective_delay(configured: Duration, crawl_delay_secs: Option<f64>) -> Duration {
    match crawl_delay_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            let robots_delay = Duration::from_secs_f64(secs).min(MAX_CRAWL_DELAY);
            configured.max(robots_delay)
        }
        _ => configured,
    }
}

/// Per-domain token bucket: one request per delay period, no burst
pub struct PolitenessLimiter {
    limiter: Option<DirectRateLimiter>,
    delay: Duration,
}

impl PolitenessLimiter {
    /// Builds a limiter; a zero delay disables limiting
    pub fn new(delay: Duration) -> Self {
        let limiter = Quota::with_period(delay).map(RateLimiter::direct);
        Self { limiter, delay }
    }

    /// Waits until the next request to the domain may start
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// A fetcher that waits on the domain's politeness limiter before each request
pub struct PoliteFetcher {
    inner: Arc<dyn PageFetcher>,
    limiter: Arc<PolitenessLimiter>,
}

impl PoliteFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, limiter: Arc<PolitenessLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl PageFetcher for PoliteFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.limiter.until_ready().await;
        self.inner.fetch(url).await
    }

    fn mode(&self) -> FetchMode {
        self.inner.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn task(path: &str, via: Discovery) -> CrawlTask {
        let url = Url::parse("https://example.com/").unwrap().join(path).unwrap();
        CrawlTask::new(url, None, via)
    }

    #[test]
    fn test_frontier_is_fifo() {
        let mut frontier = Frontier::new();
        assert!(frontier.push(task("/contact", Discovery::PriorityPath)));
        assert!(frontier.push(task("/a", Discovery::Link)));
        assert!(frontier.push(task("/b", Discovery::Sitemap)));
        assert_eq!(frontier.len(), 3);

        let order: Vec<String> = std::iter::from_fn(|| frontier.pop())
            .map(|t| t.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/contact", "/a", "/b"]);
    }

    #[test]
    fn test_frontier_never_enqueues_twice() {
        let mut frontier = Frontier::new();
        assert!(frontier.push(task("/a", Discovery::Link)));
        assert!(!frontier.push(task("/a#top", Discovery::Link)));
        assert!(!frontier.push(task("/a/", Discovery::PriorityPath)));

        frontier.pop();
        // still visited after being dequeued
        assert!(!frontier.push(task("/a", Discovery::Sitemap)));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_mark_visited_blocks_enqueue() {
        let mut frontier = Frontier::new();
        let home = Url::parse("https://example.com/").unwrap();
        assert!(frontier.mark_visited(&home));
        assert!(!frontier.push(CrawlTask::new(home, None, Discovery::PriorityPath)));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_effective_delay() {
        let configured = Duration::from_millis(500);
        assert_eq!(effective_delay(configured, None), configured);
        assert_eq!(effective_delay(configured, Some(0.1)), configured);
        assert_eq!(effective_delay(configured, Some(2.0)), Duration::from_secs(2));
        assert_eq!(effective_delay(configured, Some(3600.0)), MAX_CRAWL_DELAY);
        assert_eq!(effective_delay(configured, Some(f64::NAN)), configured);
    }

    #[tokio::test]
    async fn test_zero_delay_never_waits() {
        let limiter = PolitenessLimiter::new(Duration::ZERO);
        assert_eq!(limiter.delay(), Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.until_ready().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_limiter_spaces_requests() {
        let limiter = PolitenessLimiter::new(Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.until_ready().await;
        }
        // first cell is free, the next two wait one period each
        assert!(start.elapsed() >= Duration::from_millis(180));
    }
}
