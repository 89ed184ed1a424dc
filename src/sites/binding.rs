use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::Result;
use crate::page::{LivePage, PageDriver};
use crate::sites::highlight::Highlighter;
use crate::sites::observer::{spawn_observer, Augmenter, ScanFn, SelectorFn};
use crate::sites::{AdapterOptions, CommentHandle, AFFORDANCE_LABEL, STYLE_CSS, STYLE_ID};

/// What one adapter instance owns on its page: the driver, the highlight
/// slot, the augmented-comment set, the observer task and the style sheet.
pub(crate) struct PageBinding {
    pub page: Arc<LivePage>,
    pub driver: Arc<dyn PageDriver>,
    pub options: AdapterOptions,
    highlighter: Highlighter,
    augmenter: Arc<Augmenter>,
    observer: Mutex<Option<JoinHandle<()>>>,
    styled: AtomicBool,
}

impl PageBinding {
    pub fn new(page: Arc<LivePage>, driver: Arc<dyn PageDriver>, options: AdapterOptions) -> Self {
        Self {
            highlighter: Highlighter::new(driver.clone(), options.highlight_duration),
            augmenter: Arc::new(Augmenter::new(driver.clone(), AFFORDANCE_LABEL)),
            page,
            driver,
            options,
            observer: Mutex::new(None),
            styled: AtomicBool::new(false),
        }
    }

    pub async fn install_style(&self) -> Result<()> {
        if self.styled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.driver.inject_style(STYLE_ID, STYLE_CSS).await
    }

    pub async fn augment(&self, handles: &[CommentHandle], selector_for: SelectorFn) -> usize {
        self.augmenter.augment(handles, selector_for).await
    }

    /// Starts the standing observer, unless one is already running.
    pub fn observe(&self, scan: ScanFn, selector_for: SelectorFn) {
        let mut observer = self.observer.lock().unwrap_or_else(|e| e.into_inner());
        if observer.is_some() {
            return;
        }
        *observer = Some(spawn_observer(
            self.page.clone(),
            self.augmenter.clone(),
            scan,
            selector_for,
        ));
    }

    pub async fn scroll_and_highlight(&self, selector: &str) -> Result<()> {
        self.driver.scroll_into_view(selector).await?;
        self.highlighter.highlight(selector).await
    }

    /// Stops the observer and removes the style sheet. Idempotent.
    pub async fn release(&self) {
        let observer = self
            .observer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = observer {
            task.abort();
            debug!("Comment observer stopped");
        }

        if let Err(e) = self.highlighter.clear().await {
            warn!("Failed to clear highlight: {}", e);
        }

        if self.styled.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.driver.remove_style(STYLE_ID).await {
                warn!("Failed to remove injected style: {}", e);
            }
        }
    }
}

#[cfg(test)]
impl PageBinding {
    pub fn highlighted(&self) -> Option<String> {
        self.highlighter.current()
    }
}
