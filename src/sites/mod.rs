//! Per-site discussion extraction.
//!
//! Each supported platform gets one hand-written [`SiteAdapter`] that turns
//! the page's markup into the common [`Thread`] model:
//!
//! - [`HackerNewsAdapter`]: a flat table of rows, nesting encoded as indent width
//! - [`RedditAdapter`]: `shreddit-comment` elements with a `depth` attribute and
//!   content behind lazily attached shadow roots
//! - [`QuoraAdapter`]: answer cards with an optional comments sub-container
//!
//! The [`registry`] picks the adapter for a page's host.

mod binding;
pub mod hacker_news;
mod highlight;
mod observer;
pub mod quora;
pub mod reddit;
pub mod registry;

pub use hacker_news::HackerNewsAdapter;
pub use highlight::Highlighter;
pub use observer::Augmenter;
pub use quora::QuoraAdapter;
pub use reddit::RedditAdapter;
pub use registry::{get_adapter, is_supported_site, resolve_platform};

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{DiscussionContent, SummaryKind, Thread};
use crate::page::PollPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    HackerNews,
    Reddit,
    Quora,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HackerNews => "hacker_news",
            Self::Reddit => "reddit",
            Self::Quora => "quora",
        }
    }

    /// Summary kind recorded for a per-thread summary on this platform.
    pub fn thread_kind(&self) -> SummaryKind {
        match self {
            Self::Quora => SummaryKind::Answer,
            _ => SummaryKind::Thread,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HackerNews => "Hacker News",
            Self::Reddit => "Reddit",
            Self::Quora => "Quora",
        };
        f.write_str(name)
    }
}

/// An owned reference to a root-level comment in the current document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentHandle {
    pub id: String,
    /// Indent level or depth attribute as the platform reports it.
    pub native_depth: usize,
}

impl CommentHandle {
    pub fn new(id: impl Into<String>, native_depth: usize) -> Self {
        Self {
            id: id.into(),
            native_depth,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdapterOptions {
    /// Polling for the first comment nodes on lazily rendered pages.
    pub poll: PollPolicy,
    pub highlight_duration: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            highlight_duration: Duration::from_secs(3),
        }
    }
}

pub(crate) const STYLE_ID: &str = "threadline-style";

pub(crate) const STYLE_CSS: &str = r#"
.threadline-summarize-btn { margin-left: 6px; color: #666; font-size: 11px; cursor: pointer; }
.threadline-highlight { background-color: rgba(0, 121, 211, 0.05); border-left: 3px solid #0079d3; }
"#;

/// Label of the summarize control attached to each root-level comment.
pub const AFFORDANCE_LABEL: &str = "TL;DR";

#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Waits for the page to be usable and starts watching for new comments.
    ///
    /// Never fails because content is missing; partial pages are accepted.
    async fn initialize(&self) -> Result<()>;

    fn is_discussion_page(&self) -> bool;

    /// Page title, or a platform fallback when none is found.
    fn title(&self) -> String;

    /// Root-level comments of the current snapshot, in document order.
    fn top_level_comments(&self) -> Vec<CommentHandle>;

    /// The top-level comment whose thread contains `id`.
    fn thread_root(&self, id: &str) -> Option<CommentHandle> {
        self.top_level_comments().into_iter().find(|h| h.id == id)
    }

    /// Parses the thread rooted at `root`. Only true descendants are included.
    async fn parse_comment_thread(&self, root: &CommentHandle) -> Result<Thread>;

    /// The main post and every top-level thread.
    async fn page_content(&self) -> Result<DiscussionContent>;

    /// Scrolls to a comment and highlights it for a few seconds.
    async fn scroll_to_comment(&self, id: &str) -> Result<()>;

    /// Stops observers and removes injected styles. Safe to call twice.
    async fn destroy(&self);
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for adapter tests.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::app::{Result, ThreadlineError};
    use crate::page::PageDriver;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DriverCall {
        Scroll(String),
        Highlight(String, bool),
        Affordance(String),
        InjectStyle(String),
        RemoveStyle(String),
    }

    /// Records every side effect instead of performing it.
    #[derive(Debug, Default)]
    pub struct RecordingDriver {
        calls: Mutex<Vec<DriverCall>>,
        fail_highlights: bool,
    }

    impl RecordingDriver {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Every `set_highlight(_, true)` is recorded and then fails.
        pub fn failing_highlights() -> Arc<Self> {
            Arc::new(Self {
                fail_highlights: true,
                ..Self::default()
            })
        }

        pub fn calls(&self) -> Vec<DriverCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn affordances(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    DriverCall::Affordance(sel) => Some(sel),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: DriverCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl PageDriver for RecordingDriver {
        async fn scroll_into_view(&self, selector: &str) -> Result<()> {
            self.record(DriverCall::Scroll(selector.into()));
            Ok(())
        }

        async fn set_highlight(&self, selector: &str, on: bool) -> Result<()> {
            self.record(DriverCall::Highlight(selector.into(), on));
            if on && self.fail_highlights {
                return Err(ThreadlineError::Browser("element detached".into()));
            }
            Ok(())
        }

        async fn attach_affordance(&self, selector: &str, _label: &str) -> Result<()> {
            self.record(DriverCall::Affordance(selector.into()));
            Ok(())
        }

        async fn inject_style(&self, id: &str, _css: &str) -> Result<()> {
            self.record(DriverCall::InjectStyle(id.into()));
            Ok(())
        }

        async fn remove_style(&self, id: &str) -> Result<()> {
            self.record(DriverCall::RemoveStyle(id.into()));
            Ok(())
        }
    }
}
