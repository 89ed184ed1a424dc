//! The page a session works against.
//!
//! A [`LivePage`] stands in for the browser document. Loaders publish DOM
//! snapshots into it; adapters parse the latest snapshot and wait on new ones.
//!
//! ```text
//! Loader (HTTP / file / Chrome) → PageWriter ─watch─→ LivePage → SiteAdapter
//!                                       PageDriver ←─ side effects ─┘
//! ```
//!
//! Shadow roots travel inside the snapshot as a `<threadline-shadow-root>`
//! child of their host.

mod chrome;
pub mod dom;
mod driver;
mod http_loader;
mod scripts;
pub mod wait;

pub use chrome::{ChromeDriver, ChromeLoader, ChromeSession};
pub use driver::{DetachedDriver, PageDriver};
pub use http_loader::HttpLoader;
pub use wait::{poll_until, PollOutcome, PollPolicy};

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use tokio::sync::watch;
use url::Url;

use crate::app::Result;

/// One serialized state of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub url: Url,
    pub html: String,
}

impl Snapshot {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Read side of a page whose markup may keep changing.
#[derive(Debug, Clone)]
pub struct LivePage {
    url: Url,
    rx: watch::Receiver<Arc<Snapshot>>,
}

/// Write side of a [`LivePage`]. Dropping it freezes the page.
#[derive(Debug)]
pub struct PageWriter {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl LivePage {
    pub fn new(url: Url, html: impl Into<String>) -> (Self, PageWriter) {
        let snapshot = Arc::new(Snapshot {
            url: url.clone(),
            html: html.into(),
        });
        let (tx, rx) = watch::channel(snapshot);
        (Self { url, rx }, PageWriter { tx })
    }

    /// A page that will never change.
    pub fn frozen(url: Url, html: impl Into<String>) -> Self {
        let (page, _writer) = Self::new(url, html);
        page
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    /// Runs `f` against a parse of the latest snapshot.
    pub fn with_document<T>(&self, f: impl FnOnce(&Html) -> T) -> T {
        let snapshot = self.snapshot();
        let document = snapshot.document();
        f(&document)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.rx.clone()
    }

    pub fn is_frozen(&self) -> bool {
        self.rx.has_changed().is_err()
    }

    /// Re-runs `probe` on every published snapshot until it yields a value.
    ///
    /// There is no timeout. Returns `None` once the page can no longer change.
    pub async fn wait_until<T, F>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(&Html) -> Option<T> + Send,
        T: Send,
    {
        let mut rx = self.rx.clone();
        loop {
            let found = {
                let snapshot = rx.borrow_and_update().clone();
                let document = snapshot.document();
                probe(&document)
            };
            if found.is_some() {
                return found;
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

impl PageWriter {
    /// Publishes new markup. Returns false when nothing changed.
    pub fn publish(&self, html: impl Into<String>) -> bool {
        let html = html.into();
        self.tx.send_if_modified(|current| {
            if current.html == html {
                return false;
            }
            *current = Arc::new(Snapshot {
                url: current.url.clone(),
                html,
            });
            true
        })
    }

    /// True once every reader is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A loaded page plus whatever keeps it alive.
pub struct LoadedPage {
    pub page: Arc<LivePage>,
    pub driver: Arc<dyn PageDriver>,
    _session: Option<ChromeSession>,
}

impl LoadedPage {
    /// A saved page with no live document behind it.
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            page: Arc::new(LivePage::frozen(url, html)),
            driver: Arc::new(DetachedDriver),
            _session: None,
        }
    }

    pub(crate) fn live(
        page: Arc<LivePage>,
        driver: Arc<dyn PageDriver>,
        session: ChromeSession,
    ) -> Self {
        Self {
            page,
            driver,
            _session: Some(session),
        }
    }
}

#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<LoadedPage>;
}
