//! Robots.txt handling module
//!
//! robots.txt is fetched once per domain crawl. Its rules gate every URL the
//! crawl dispatches and its `Sitemap:` directives seed sitemap resolution.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::PageFetcher;
use crate::url::Site;
use crate::{FetchError, ResolutionError};

/// Fetches and parses robots.txt for a site
///
/// A missing robots.txt (any 4xx) means everything is allowed.
///
/// # Errors
///
/// Returns `ResolutionError::Robots` for network failures and server errors;
/// callers treat that as allow-all as well.
pub async fn fetch_robots(
    fetcher: &dyn PageFetcher,
    site: &Site,
) -> Result<ParsedRobots, ResolutionError> {
    let mut url = site.root.clone();
    url.set_path("/robots.txt");

    match fetcher.fetch(&url).await {
        Ok(page) => {
            tracing::debug!("Fetched robots.txt for {} ({} bytes)", site.host, page.content.len());
            Ok(ParsedRobots::from_content(&page.content))
        }
        Err(FetchError::Status { status, .. }) if (400..500).contains(&status) => {
            tracing::debug!("No robots.txt for {} (HTTP {})", site.host, status);
            Ok(ParsedRobots::allow_all())
        }
        Err(source) => Err(ResolutionError::Robots {
            domain: site.host.clone(),
            source,
        }),
    }
}
