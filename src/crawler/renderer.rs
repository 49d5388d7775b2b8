//! Headless-browser fetch strategy
//!
//! One browser process is shared by every render of a domain crawl; each
//! fetch opens a tab, waits for the page to settle and returns the DOM.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::{FetchMode, FetchedPage, PageFetcher};
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use url::Url;

/// Extra wait after navigation for late XHR-driven content
const SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Renders pages in a shared headless Chrome
pub struct RenderedFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    renders: Semaphore,
    timeout: Duration,
}

impl RenderedFetcher {
    /// Launches the browser
    ///
    /// # Arguments
    ///
    /// * `config` - Fetcher configuration (user agent, timeout, executable)
    /// * `max_renders` - Maximum tabs loading at the same time
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Browser` if Chrome cannot be found or started.
    pub async fn launch(config: &FetcherConfig, max_renders: u32) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(config.rendered_timeout())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent));

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(|message| FetchError::Browser {
            url: "about:blank".to_string(),
            message,
        })?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| FetchError::Browser {
                    url: "about:blank".to_string(),
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Launched headless browser ({} concurrent renders)", max_renders);

        Ok(Self {
            browser,
            handler,
            renders: Semaphore::new(max_renders.max(1) as usize),
            timeout: config.rendered_timeout(),
        })
    }

    /// Closes the browser process
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    /// Renders one page within the fetch timeout
    ///
    /// The tab is closed whether loading succeeds, fails or times out.
    async fn render(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let browser_error = |e: chromiumoxide::error::CdpError| FetchError::Browser {
            url: url.to_string(),
            message: e.to_string(),
        };
        let timed_out = |_| FetchError::Timeout {
            url: url.to_string(),
        };
        let deadline = tokio::time::Instant::now() + self.timeout;

        let page = tokio::time::timeout_at(deadline, self.browser.new_page(url.as_str()))
            .await
            .map_err(timed_out)?
            .map_err(browser_error)?;

        let loaded = async {
            page.wait_for_navigation().await.map_err(browser_error)?;
            tokio::time::sleep(SETTLE_DELAY).await;
            let content = page.content().await.map_err(browser_error)?;
            let final_url = page
                .url()
                .await
                .ok()
                .flatten()
                .and_then(|u| Url::parse(&u).ok())
                .unwrap_or_else(|| url.clone());
            Ok::<_, FetchError>((content, final_url))
        };
        let loaded = tokio::time::timeout_at(deadline, loaded)
            .await
            .map_err(timed_out)
            .and_then(|result| result);

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }

        let (content, final_url) = loaded?;
        Ok(FetchedPage {
            url: final_url,
            content,
            content_type: "text/html".to_string(),
            status: 200,
        })
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .renders
            .acquire()
            .await
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Rendering {}", url);
        self.render(url).await
    }

    fn mode(&self) -> FetchMode {
        FetchMode::Rendered
    }
}
