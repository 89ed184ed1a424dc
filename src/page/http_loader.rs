use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::app::Result;
use crate::config::BrowserConfig;
use crate::page::{LoadedPage, PageLoader};

/// Fetches a page once over HTTP. The result is a frozen page: nothing
/// rendered client-side (shadow roots, lazy comments) will ever appear.
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true);

        builder = match config.user_agent {
            Some(ref ua) => builder.user_agent(ua.clone()),
            None => builder.user_agent(concat!("threadline/", env!("CARGO_PKG_VERSION"))),
        };

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageLoader for HttpLoader {
    async fn load(&self, url: &Url) -> Result<LoadedPage> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.as_str()).send().await?;
        response.error_for_status_ref()?;

        // Redirects may land on another host (old.reddit.com → www.reddit.com)
        let final_url = response.url().clone();
        let html = response.text().await?;
        info!("Fetched {} ({} bytes)", final_url, html.len());

        Ok(LoadedPage::from_html(final_url, html))
    }
}
