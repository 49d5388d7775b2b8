use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Scout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Crawl traversal and halting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum pages fetched per domain after the priority scan
    #[serde(rename = "max-pages-per-domain")]
    pub max_pages_per_domain: u32,

    /// The crawl stops once more distinct contacts than this were found
    #[serde(rename = "max-contacts-per-domain")]
    pub max_contacts_per_domain: u32,

    /// Stop after the priority scan when it produced any email
    #[serde(rename = "halt-on-priority-contact")]
    pub halt_on_priority_contact: bool,

    /// Maximum page fetches in flight for one domain
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Maximum headless-browser renders in flight for one domain
    #[serde(rename = "max-concurrent-renders")]
    pub max_concurrent_renders: u32,

    /// Maximum domains crawled at the same time
    #[serde(rename = "max-concurrent-domains")]
    pub max_concurrent_domains: u32,

    /// Minimum time between requests to the same domain (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Skip URLs disallowed by the site's robots.txt
    #[serde(rename = "respect-robots-txt")]
    pub respect_robots_txt: bool,

    /// Paths probed on every site during the priority scan
    #[serde(rename = "priority-paths")]
    pub priority_paths: Vec<String>,

    /// Keywords that promote a homepage link into the priority scan
    #[serde(rename = "priority-keywords")]
    pub priority_keywords: Vec<String>,

    /// Maximum keyword-matched homepage links added to the priority scan
    #[serde(rename = "max-priority-links")]
    pub max_priority_links: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages_per_domain: 50,
            max_contacts_per_domain: 20,
            halt_on_priority_contact: true,
            max_concurrent_fetches: 4,
            max_concurrent_renders: 1,
            max_concurrent_domains: 4,
            politeness_delay_ms: 500,
            respect_robots_txt: true,
            priority_paths: ["/contact", "/contact-us", "/about", "/about-us"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            priority_keywords: [
                "contact",
                "about",
                "team",
                "impressum",
                "get in touch",
                "reach us",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            max_priority_links: 10,
        }
    }
}

impl CrawlerConfig {
    /// Returns the configured politeness delay
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with static requests and by the renderer
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with static requests
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Timeout for a single static request (seconds)
    #[serde(rename = "static-timeout-secs")]
    pub static_timeout_secs: u64,

    /// Timeout for a single rendered page load (seconds)
    #[serde(rename = "rendered-timeout-secs")]
    pub rendered_timeout_secs: u64,

    /// Allow the headless-browser strategy for sites that need it
    #[serde(rename = "enable-rendering")]
    pub enable_rendering: bool,

    /// Explicit Chrome/Chromium binary, otherwise auto-detected
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            static_timeout_secs: 15,
            rendered_timeout_secs: 25,
            enable_rendering: true,
            chrome_executable: None,
        }
    }
}

impl FetcherConfig {
    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    pub fn rendered_timeout(&self) -> Duration {
        Duration::from_secs(self.rendered_timeout_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
