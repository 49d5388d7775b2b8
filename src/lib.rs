//! Sumi-Scout: a polite contact discovery crawler
//!
//! This crate crawls a set of websites, prioritizing pages that are likely to
//! carry contact details, and extracts publicly listed email addresses together
//! with the names and titles found next to them.

pub mod collaborators;
pub mod config;
pub mod contacts;
pub mod crawler;
pub mod email;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Main error type for Sumi-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Errors raised while retrieving a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Unsupported content type {content_type} for {url}")]
    Unsupported { url: String, content_type: String },
}

impl FetchError {
    /// Returns the URL the failed request targeted
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Browser { url, .. }
            | Self::Unsupported { url, .. } => url,
        }
    }

    /// Returns true for a plain 404, which is routine for guessed paths
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Errors raised while interpreting fetched content
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("HTML parse error for {url}: {message}")]
    Html { url: String, message: String },

    #[error("XML parse error for {url}: {message}")]
    Xml { url: String, message: String },

    #[error("Malformed obfuscated email payload: {0}")]
    Obfuscation(String),
}

/// Errors raised while resolving robots.txt and sitemaps
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to fetch robots.txt for {domain}: {source}")]
    Robots { domain: String, source: FetchError },

    #[error("Failed to fetch sitemap {url}: {source}")]
    Sitemap { url: String, source: FetchError },

    #[error("Failed to parse sitemap: {0}")]
    SitemapParse(#[from] ParseError),
}

/// Result type alias for Sumi-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for single-URL fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scout=info,warn"),
            1 => EnvFilter::new("sumi_scout=debug,info"),
            2 => EnvFilter::new("sumi_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .try_init();
}

// Re-export commonly used types
pub use config::Config;
pub use contacts::{Confidence, ContactAnalyzer, ContactCandidate, DomainResult, ResultAggregator};
pub use crawler::{CrawlEngine, CrawlReport, DomainOutcome, FetchMode};
pub use state::CrawlPhase;
pub use url::{normalize_url, registrable_domain, Site};
