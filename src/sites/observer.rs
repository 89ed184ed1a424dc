use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use scraper::Html;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::page::{LivePage, PageDriver};
use crate::sites::CommentHandle;

/// Finds the root-level comments in a parsed snapshot.
pub(crate) type ScanFn = fn(&Html) -> Vec<CommentHandle>;

/// Builds the CSS selector addressing a comment by id.
pub(crate) type SelectorFn = fn(&str) -> String;

/// Attaches the summarize control to each comment exactly once.
pub struct Augmenter {
    driver: Arc<dyn PageDriver>,
    label: &'static str,
    seen: Mutex<HashSet<String>>,
}

impl Augmenter {
    pub fn new(driver: Arc<dyn PageDriver>, label: &'static str) -> Self {
        Self {
            driver,
            label,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Augments the handles not seen before. Returns how many were new.
    pub async fn augment(&self, handles: &[CommentHandle], selector_for: SelectorFn) -> usize {
        let fresh: Vec<&CommentHandle> = {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            handles.iter().filter(|h| seen.insert(h.id.clone())).collect()
        };

        for handle in &fresh {
            let selector = selector_for(&handle.id);
            if let Err(e) = self.driver.attach_affordance(&selector, self.label).await {
                warn!("Failed to attach control to {}: {}", handle.id, e);
            }
        }
        fresh.len()
    }
}

#[cfg(test)]
impl Augmenter {
    pub fn is_augmented(&self, id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    pub fn augmented_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Watches the page for the rest of its life and augments new comments.
///
/// The task ends by itself once the page is frozen.
pub(crate) fn spawn_observer(
    page: Arc<LivePage>,
    augmenter: Arc<Augmenter>,
    scan: ScanFn,
    selector_for: SelectorFn,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = page.subscribe();
        loop {
            let handles = {
                let snapshot = rx.borrow_and_update().clone();
                let document = snapshot.document();
                scan(&document)
            };
            let added = augmenter.augment(&handles, selector_for).await;
            if added > 0 {
                debug!("Observer augmented {} new comments", added);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        debug!("Page frozen, comment observer stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::dom;
    use crate::sites::testing::RecordingDriver;
    use std::time::Duration;
    use url::Url;

    fn scan(doc: &Html) -> Vec<CommentHandle> {
        let sel = dom::selector("li.c");
        doc.select(&sel)
            .filter_map(|el| el.value().id().map(|id| CommentHandle::new(id, 0)))
            .collect()
    }

    fn selector_for(id: &str) -> String {
        format!("#{id}")
    }

    #[tokio::test]
    async fn test_augment_is_idempotent() {
        let driver = RecordingDriver::new();
        let augmenter = Augmenter::new(driver.clone(), "TL;DR");
        let handles = vec![CommentHandle::new("a", 0), CommentHandle::new("b", 0)];

        assert_eq!(augmenter.augment(&handles, selector_for).await, 2);
        assert_eq!(augmenter.augment(&handles, selector_for).await, 0);
        assert_eq!(driver.affordances(), vec!["#a", "#b"]);
        assert!(augmenter.is_augmented("a"));
    }

    #[tokio::test]
    async fn test_observer_picks_up_late_comments() {
        let url = Url::parse("https://example.com/").unwrap();
        let (page, writer) = LivePage::new(url, "<ul><li class=\"c\" id=\"a\"></li></ul>");
        let driver = RecordingDriver::new();
        let augmenter = Arc::new(Augmenter::new(driver.clone(), "TL;DR"));

        let task = spawn_observer(Arc::new(page), augmenter.clone(), scan, selector_for);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(augmenter.augmented_count(), 1);

        writer.publish("<ul><li class=\"c\" id=\"a\"></li><li class=\"c\" id=\"b\"></li></ul>");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(driver.affordances(), vec!["#a", "#b"]);

        drop(writer);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("observer stops once the page is frozen")
            .unwrap();
    }
}
