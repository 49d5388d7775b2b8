//! Integration tests for sumi-scout
//!
//! These tests use wiremock to stand up mock websites and run full domain
//! crawls against them.

mod crawl_tests;
mod sitemap_tests;

use std::sync::Arc;
use sumi_scout::config::Config;
use sumi_scout::{ContactAnalyzer, CrawlEngine};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration: no rendering, no politeness delay
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.politeness_delay_ms = 0;
    config.fetcher.enable_rendering = false;
    config.fetcher.static_timeout_secs = 5;
    config
}

/// Creates an engine without a name extractor
pub fn engine(config: Config) -> CrawlEngine {
    CrawlEngine::new(Arc::new(config), ContactAnalyzer::without_names()).expect("Failed to build engine")
}

/// Mounts an HTML page at `route`
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Mounts an HTML page at `route` that must be requested exactly `times` times
pub async fn mount_html_expect(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

/// Wraps body markup in a minimal HTML document
pub fn page(body: &str) -> String {
    format!("<html><head><title>Test</title></head><body>{}</body></html>", body)
}
