use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::Result;
use crate::page::PageDriver;

#[derive(Default)]
struct Slot {
    current: Option<String>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

/// Owns the single "currently highlighted" slot of a page.
///
/// Highlighting a new element clears the previous one; every highlight
/// expires on its own after `duration`.
pub struct Highlighter {
    driver: Arc<dyn PageDriver>,
    duration: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl Highlighter {
    pub fn new(driver: Arc<dyn PageDriver>, duration: Duration) -> Self {
        Self {
            driver,
            duration,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.lock().current.clone()
    }

    pub async fn highlight(&self, selector: &str) -> Result<()> {
        let (previous, generation) = {
            let mut slot = self.lock();
            slot.generation += 1;
            if let Some(expiry) = slot.expiry.take() {
                expiry.abort();
            }
            (slot.current.clone(), slot.generation)
        };

        if let Some(previous) = previous.filter(|p| p != selector) {
            self.driver.set_highlight(&previous, false).await?;
        }
        if let Err(e) = self.driver.set_highlight(selector, true).await {
            let mut slot = self.lock();
            if slot.generation == generation {
                slot.current = None;
            }
            return Err(e);
        }

        let driver = self.driver.clone();
        let slot = self.slot.clone();
        let duration = self.duration;
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let expired = {
                let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
                if slot.generation == generation {
                    slot.expiry = None;
                    slot.current.take()
                } else {
                    None
                }
            };
            if let Some(selector) = expired {
                if let Err(e) = driver.set_highlight(&selector, false).await {
                    warn!("Failed to clear highlight on {}: {}", selector, e);
                }
            }
        });

        let mut slot = self.lock();
        if slot.generation == generation {
            slot.current = Some(selector.to_string());
            slot.expiry = Some(expiry);
        } else {
            expiry.abort();
        }
        Ok(())
    }

    /// Drops the current highlight immediately.
    pub async fn clear(&self) -> Result<()> {
        let previous = {
            let mut slot = self.lock();
            slot.generation += 1;
            if let Some(expiry) = slot.expiry.take() {
                expiry.abort();
            }
            slot.current.take()
        };
        if let Some(previous) = previous {
            self.driver.set_highlight(&previous, false).await?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::testing::{DriverCall, RecordingDriver};

    #[tokio::test(start_paused = true)]
    async fn test_highlight_expires_after_duration() {
        let driver = RecordingDriver::new();
        let highlighter = Highlighter::new(driver.clone(), Duration::from_secs(3));

        highlighter.highlight("#a").await.unwrap();
        assert_eq!(highlighter.current().as_deref(), Some("#a"));

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(highlighter.current().as_deref(), Some("#a"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(highlighter.current(), None);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Highlight("#a".into(), true),
                DriverCall::Highlight("#a".into(), false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_highlight_clears_previous() {
        let driver = RecordingDriver::new();
        let highlighter = Highlighter::new(driver.clone(), Duration::from_secs(3));

        highlighter.highlight("#a").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        highlighter.highlight("#b").await.unwrap();

        // The first highlight's timer must not clear the second one.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(highlighter.current().as_deref(), Some("#b"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(highlighter.current(), None);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Highlight("#a".into(), true),
                DriverCall::Highlight("#a".into(), false),
                DriverCall::Highlight("#b".into(), true),
                DriverCall::Highlight("#b".into(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_highlight_is_not_recorded() {
        let driver = RecordingDriver::failing_highlights();
        let highlighter = Highlighter::new(driver.clone(), Duration::from_secs(3));

        assert!(highlighter.highlight("#a").await.is_err());
        assert_eq!(highlighter.current(), None);
        assert_eq!(driver.calls(), vec![DriverCall::Highlight("#a".into(), true)]);

        highlighter.clear().await.unwrap();
        assert_eq!(driver.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let driver = RecordingDriver::new();
        let highlighter = Highlighter::new(driver.clone(), Duration::from_secs(3));

        highlighter.highlight("#a").await.unwrap();
        highlighter.clear().await.unwrap();
        highlighter.clear().await.unwrap();
        assert_eq!(highlighter.current(), None);
        assert_eq!(driver.calls().len(), 2);
    }
}
