use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{Result, ThreadlineError};
use crate::config::BrowserConfig;
use crate::page::{scripts, LivePage, LoadedPage, PageDriver, PageLoader, PageWriter};

/// Loads pages in headless Chrome and keeps their snapshots current.
pub struct ChromeLoader {
    config: BrowserConfig,
}

/// Keeps a Chrome-backed page alive. Dropping it stops the refresher and
/// freezes the page.
pub struct ChromeSession {
    _browser: Browser,
    handler: JoinHandle<()>,
    refresher: JoinHandle<()>,
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.refresher.abort();
        self.handler.abort();
    }
}

impl ChromeLoader {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>)> {
        let mut builder = ChromeConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !self.config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ThreadlineError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ThreadlineError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            )))?;

        // Spawn the browser handler
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Handle browser events
            }
        });

        Ok((browser, handler))
    }

    async fn open(&self, browser: &Browser, url: &Url) -> Result<Page> {
        let page = browser
            .new_page(url.as_str())
            .await
            .map_err(|e| ThreadlineError::Browser(format!("Failed to create page: {}", e)))?;

        // Set user agent if configured
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| ThreadlineError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| ThreadlineError::Browser(format!("Navigation failed: {}", e)))?;

        Ok(page)
    }
}

#[async_trait]
impl PageLoader for ChromeLoader {
    async fn load(&self, url: &Url) -> Result<LoadedPage> {
        let (browser, handler) = self.launch().await?;

        let page = tokio::time::timeout(self.config.timeout(), self.open(&browser, url))
            .await
            .map_err(|_| ThreadlineError::Browser(format!("Timed out loading {}", url)))??;

        // Additional wait for dynamic content
        tokio::time::sleep(self.config.wait_after_load()).await;

        let html = serialize(&page).await?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());
        info!("Loaded {} in Chrome ({} bytes)", final_url, html.len());

        let (live, writer) = LivePage::new(final_url, html);
        let refresher = tokio::spawn(refresh(page.clone(), writer, self.config.refresh_interval()));

        let session = ChromeSession {
            _browser: browser,
            handler,
            refresher,
        };

        Ok(LoadedPage::live(
            Arc::new(live),
            Arc::new(ChromeDriver::new(page)),
            session,
        ))
    }
}

async fn serialize(page: &Page) -> Result<String> {
    page.evaluate(scripts::serialize_document().to_string())
        .await
        .map_err(|e| ThreadlineError::Browser(format!("Script execution failed: {}", e)))?
        .into_value::<String>()
        .map_err(|e| ThreadlineError::Browser(format!("Failed to parse result: {:?}", e)))
}

/// Re-serializes the page on an interval and publishes changes.
async fn refresh(page: Page, writer: PageWriter, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if writer.is_closed() {
            break;
        }
        match serialize(&page).await {
            Ok(html) => {
                if writer.publish(html) {
                    debug!("Published new page snapshot");
                }
            }
            Err(e) => {
                warn!("Stopping page refresh: {}", e);
                break;
            }
        }
    }
}

/// Performs page side effects by evaluating scripts in Chrome.
pub struct ChromeDriver {
    page: Page,
}

impl ChromeDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn run(&self, script: String) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ThreadlineError::Browser(format!("Script execution failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        self.run(scripts::scroll_into_view(selector)).await
    }

    async fn set_highlight(&self, selector: &str, on: bool) -> Result<()> {
        self.run(scripts::set_highlight(selector, on)).await
    }

    async fn attach_affordance(&self, selector: &str, label: &str) -> Result<()> {
        self.run(scripts::attach_affordance(selector, label)).await
    }

    async fn inject_style(&self, id: &str, css: &str) -> Result<()> {
        self.run(scripts::inject_style(id, css)).await
    }

    async fn remove_style(&self, id: &str) -> Result<()> {
        self.run(scripts::remove_style(id)).await
    }
}
