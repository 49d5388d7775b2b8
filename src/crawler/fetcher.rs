//! Page fetching
//!
//! This module handles retrieving a single URL:
//! - The `PageFetcher` seam shared by the static and rendered strategies
//! - Building HTTP clients with browser-like headers
//! - Classifying request failures into `FetchError` kinds
//! - Choosing a site's fetch mode from a homepage probe

use crate::config::FetcherConfig;
use crate::crawler::parser::ExtractedPage;
use crate::email::{find_emails, PROTECTION_MARKER};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;
use url::Url;

/// How pages of a site are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Plain HTTP GET
    Static,
    /// Headless-browser render of the final DOM
    Rendered,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Rendered => "rendered",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A successfully retrieved URL
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,
    /// Response body or rendered DOM
    pub content: String,
    /// Content-Type header value (lowercase, may be empty)
    pub content_type: String,
    /// HTTP status code
    pub status: u16,
}

impl FetchedPage {
    /// True for HTML content, or untyped content that looks like HTML
    pub fn is_html(&self) -> bool {
        if self.content_type.contains("html") {
            return true;
        }
        self.content_type.is_empty() && self.content.trim_start().starts_with('<')
    }
}

/// Retrieves one URL
///
/// Implementations never panic on network failures; every failure is a
/// `FetchError` the crawl engine matches on.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, returning its content or the reason it failed
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;

    /// The strategy this fetcher implements
    fn mode(&self) -> FetchMode;
}

/// Certificate verification policy for an HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Verify certificates (crawling)
    Strict,
    /// Accept invalid certificates (WHOIS and third-party lookups only)
    Relaxed,
}

/// Builds an HTTP client with browser-like headers
///
/// # Arguments
///
/// * `config` - The fetcher configuration
/// * `tls` - Whether certificate errors are tolerated
///
/// # Example
///
/// ```no_run
/// use sumi_scout::config::FetcherConfig;
/// use sumi_scout::crawler::{build_http_client, TlsPolicy};
///
/// let client = build_http_client(&FetcherConfig::default(), TlsPolicy::Strict).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig, tls: TlsPolicy) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    let timeout = config.static_timeout();

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(tls == TlsPolicy::Relaxed)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Single-GET fetch strategy
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    /// Builds a fetcher with a strict-TLS client from the configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, TlsPolicy::Strict)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !is_textual(&content_type) {
            return Err(FetchError::Unsupported {
                url: url.to_string(),
                content_type,
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        Ok(FetchedPage {
            url: final_url,
            content,
            content_type,
            status: status.as_u16(),
        })
    }

    fn mode(&self) -> FetchMode {
        FetchMode::Static
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Content types whose body is worth reading
fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
}

/// Picks the fetch mode from the statically fetched homepage
///
/// A page with no internal or document links is most likely assembled by
/// JavaScript. A page carrying protected-email markers but no plain
/// addresses in its raw HTML is also rendered so the decoded DOM is seen.
///
/// # Arguments
///
/// * `raw_html` - The homepage body as served
/// * `extracted` - What the link extractor found in it
pub fn classify_probe(raw_html: &str, extracted: &ExtractedPage) -> FetchMode {
    if extracted.page_links.is_empty() && extracted.document_links.is_empty() {
        return FetchMode::Rendered;
    }

    if raw_html.contains(PROTECTION_MARKER) && find_emails(raw_html).is_empty() {
        return FetchMode::Rendered;
    }

    FetchMode::Static
}
