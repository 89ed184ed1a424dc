use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::app::error::Result;
use crate::config::Config;
use crate::page::{ChromeLoader, HttpLoader, LoadedPage, PageLoader};
use crate::session::Session;
use crate::sites::AdapterOptions;
use crate::summarizer::{SummaryClient, Summarizer};

/// Where page markup comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Http,
    Chrome,
    /// A saved page; the URL is only used to pick the adapter.
    File(PathBuf),
}

pub struct AppContext {
    pub config: Config,
    pub summarizer: Arc<dyn Summarizer>,
    pub loader: Arc<dyn PageLoader>,
    pub options: AdapterOptions,
}

/// A started session together with the page that keeps it alive.
pub struct OpenSession {
    pub session: Session,
    pub loaded: LoadedPage,
}

impl AppContext {
    pub fn new(config: Config, source: PageSource) -> Result<Self> {
        let summarizer: Arc<dyn Summarizer> = Arc::new(SummaryClient::new(&config.summary)?);
        let loader: Arc<dyn PageLoader> = match source {
            PageSource::Http => Arc::new(HttpLoader::new(&config.browser)?),
            PageSource::Chrome => Arc::new(ChromeLoader::new(config.browser.clone())),
            PageSource::File(path) => Arc::new(FileLoader { path }),
        };

        Ok(Self {
            config,
            summarizer,
            loader,
            options: AdapterOptions::default(),
        })
    }

    pub async fn load(&self, url: &str) -> Result<LoadedPage> {
        let url = Url::parse(url)?;
        self.loader.load(&url).await
    }

    /// Loads `url` and starts a session on it.
    pub async fn open(&self, url: &str) -> Result<OpenSession> {
        let loaded = self.load(url).await?;
        let session = Session::start(
            loaded.page.clone(),
            loaded.driver.clone(),
            self.summarizer.clone(),
            self.config.summary.clone(),
            self.options,
        )
        .await?;
        Ok(OpenSession { session, loaded })
    }
}

struct FileLoader {
    path: PathBuf,
}

#[async_trait]
impl PageLoader for FileLoader {
    async fn load(&self, url: &Url) -> Result<LoadedPage> {
        debug!("Reading {} as {}", self.path.display(), url);
        let html = tokio::fs::read_to_string(&self.path).await?;
        Ok(LoadedPage::from_html(url.clone(), html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HN_ITEM: &str = r#"<html><body>
        <span class="titleline"><a href="https://example.com">Show HN: A thing</a></span>
        <table class="comment-tree">
          <tr class="athing comtr" id="7"><td><table><tr>
            <td class="ind" indent="0"></td>
            <td><a class="hnuser">dang</a><div class="commtext">Nice.</div></td>
          </tr></table></td></tr>
        </table></body></html>"#;

    #[tokio::test]
    async fn test_file_source_opens_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item.html");
        std::fs::write(&path, HN_ITEM).unwrap();

        let ctx = AppContext::new(Config::default(), PageSource::File(path)).unwrap();
        let open = ctx
            .open("https://news.ycombinator.com/item?id=1")
            .await
            .unwrap();

        assert!(open.loaded.page.is_frozen());
        let info = open.session.page_info();
        assert_eq!(info.title, "Show HN: A thing");
        assert_eq!(info.platform, "hacker_news");
        assert_eq!(open.session.adapter().top_level_comments().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let ctx = AppContext::new(
            Config::default(),
            PageSource::File(PathBuf::from("/nonexistent/threadline.html")),
        )
        .unwrap();
        assert!(matches!(
            ctx.load("https://www.reddit.com/r/rust/comments/1/x/").await,
            Err(crate::app::ThreadlineError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let ctx = AppContext::new(Config::default(), PageSource::File(PathBuf::from("x"))).unwrap();
        assert!(matches!(
            ctx.load("not a url").await,
            Err(crate::app::ThreadlineError::InvalidUrl(_))
        ));
    }
}
