use async_trait::async_trait;
use tracing::debug;

use crate::app::Result;

/// Side effects on the live document, addressed by CSS selector.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn scroll_into_view(&self, selector: &str) -> Result<()>;

    async fn set_highlight(&self, selector: &str, on: bool) -> Result<()>;

    /// Inserts a summarize control labelled `label` next to the element.
    async fn attach_affordance(&self, selector: &str, label: &str) -> Result<()>;

    async fn inject_style(&self, id: &str, css: &str) -> Result<()>;

    async fn remove_style(&self, id: &str) -> Result<()>;
}

/// Driver for pages with no live document behind them (saved or fetched HTML).
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedDriver;

#[async_trait]
impl PageDriver for DetachedDriver {
    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        debug!("Detached page: scroll to {}", selector);
        Ok(())
    }

    async fn set_highlight(&self, selector: &str, on: bool) -> Result<()> {
        debug!("Detached page: highlight {} = {}", selector, on);
        Ok(())
    }

    async fn attach_affordance(&self, selector: &str, label: &str) -> Result<()> {
        debug!("Detached page: affordance {:?} on {}", label, selector);
        Ok(())
    }

    async fn inject_style(&self, id: &str, _css: &str) -> Result<()> {
        debug!("Detached page: inject style {}", id);
        Ok(())
    }

    async fn remove_style(&self, id: &str) -> Result<()> {
        debug!("Detached page: remove style {}", id);
        Ok(())
    }
}
