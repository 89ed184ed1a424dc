//! One page view: the chosen adapter, the summarizer and the panel.
//!
//! A [`Session`] is created explicitly for a page and destroyed explicitly
//! when the page goes away. Every user-triggered action is handled here and
//! failures are turned into panel state and a typed error, never a panic.

pub mod markdown;
pub mod messages;
pub mod panel;

pub use markdown::render_markdown;
pub use messages::{parse_request, Action, MessageResponse, PageInfo, PageKind};
pub use panel::{AffordanceState, Panel, PanelStatus};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::app::{Result, ThreadlineError};
use crate::config::SummarySettings;
use crate::domain::{SummaryKind, SummaryRecord, Thread};
use crate::formatter::formatter_for;
use crate::page::{LivePage, PageDriver};
use crate::sites::{get_adapter, AdapterOptions, CommentHandle, SiteAdapter};
use crate::summarizer::Summarizer;

/// Cache key of the main post summary.
pub const MAIN_POST_ID: &str = "main";

pub struct Session {
    page: Arc<LivePage>,
    adapter: Box<dyn SiteAdapter>,
    summarizer: Arc<dyn Summarizer>,
    settings: SummarySettings,
    panel: Mutex<Panel>,
    destroyed: AtomicBool,
}

impl Session {
    /// Picks the adapter for the page, initializes it and, if configured,
    /// summarizes the main post right away.
    pub async fn start(
        page: Arc<LivePage>,
        driver: Arc<dyn PageDriver>,
        summarizer: Arc<dyn Summarizer>,
        settings: SummarySettings,
        options: AdapterOptions,
    ) -> Result<Self> {
        let adapter = get_adapter(page.clone(), driver, options)?;
        adapter.initialize().await?;

        let session = Self {
            page,
            adapter,
            summarizer,
            settings,
            panel: Mutex::new(Panel::new()),
            destroyed: AtomicBool::new(false),
        };
        info!(
            "Session started on {} ({})",
            session.page.url(),
            session.adapter.platform()
        );

        if session.settings.auto_summarize && session.adapter.is_discussion_page() {
            if let Err(e) = session.summarize_page().await {
                warn!("Automatic summary failed: {}", e);
            }
        }
        Ok(session)
    }

    pub fn adapter(&self) -> &dyn SiteAdapter {
        self.adapter.as_ref()
    }

    pub fn panel(&self) -> MutexGuard<'_, Panel> {
        self.panel.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Summarizes the main post together with every thread.
    pub async fn summarize_page(&self) -> Result<SummaryRecord> {
        {
            let mut panel = self.panel();
            panel.show();
            panel.set_loading("Analyzing discussion...");
        }

        let result = self.request_page_summary().await;
        if self.is_destroyed() {
            debug!("Session destroyed, discarding page summary");
            return result.map(|(record, _, _)| record);
        }

        match result {
            Ok((record, title, thread_count)) => {
                self.panel().set_main(title, thread_count, record.clone());
                Ok(record)
            }
            Err(e) => {
                error!("Page summary failed: {}", e);
                self.panel().set_error(e.user_message());
                Err(e)
            }
        }
    }

    async fn request_page_summary(&self) -> Result<(SummaryRecord, String, usize)> {
        let content = self.adapter.page_content().await?;
        let platform = self.adapter.platform();
        let prompt = formatter_for(platform).format_discussion(&content);

        let language = self.settings.language().for_platform(platform);
        let summary = self
            .summarizer
            .summarize(&prompt, language, self.settings.length())
            .await?;

        let record = SummaryRecord::new(
            MAIN_POST_ID,
            SummaryKind::MainPost,
            summary,
            content.main_post.author.clone().unwrap_or_default(),
            content.comment_count(),
        );
        Ok((record, content.main_post.title, content.threads.len()))
    }

    /// Summarizes one top-level thread. A failure only affects this thread.
    pub async fn summarize_thread(&self, handle: &CommentHandle) -> Result<SummaryRecord> {
        self.panel()
            .set_affordance(&handle.id, AffordanceState::Pending);

        let result = self.request_thread_summary(handle).await;
        if self.is_destroyed() {
            debug!("Session destroyed, discarding summary of {}", handle.id);
            return result;
        }

        let mut panel = self.panel();
        match result {
            Ok(record) => {
                panel.upsert_thread(record.clone());
                panel.set_affordance(&handle.id, AffordanceState::Done);
                panel.show();
                Ok(record)
            }
            Err(e) => {
                error!("Summary of {} failed: {}", handle.id, e);
                panel.set_affordance(&handle.id, AffordanceState::Failed);
                panel.set_error(e.user_message());
                Err(e)
            }
        }
    }

    async fn request_thread_summary(&self, handle: &CommentHandle) -> Result<SummaryRecord> {
        let thread: Thread = self.adapter.parse_comment_thread(handle).await?;
        let platform = self.adapter.platform();
        let prompt = formatter_for(platform).format_thread(&thread, &self.adapter.title());

        let language = self.settings.language().for_platform(platform);
        let summary = self
            .summarizer
            .summarize(&prompt, language, self.settings.length())
            .await?;

        Ok(SummaryRecord::new(
            thread.id.clone(),
            platform.thread_kind(),
            summary,
            thread.root.author.clone(),
            thread.reply_count(),
        ))
    }

    /// Summarizes the thread containing comment `id`.
    pub async fn summarize_thread_by_id(&self, id: &str) -> Result<SummaryRecord> {
        let handle = self
            .adapter
            .thread_root(id)
            .ok_or_else(|| ThreadlineError::Extraction(format!("No thread contains comment {id}")))?;
        self.summarize_thread(&handle).await
    }

    /// Scrolls the page to the comment a thread summary belongs to.
    pub async fn focus_thread(&self, id: &str) -> Result<()> {
        self.adapter.scroll_to_comment(id).await
    }

    /// Returns the new visibility.
    pub fn toggle_sidebar(&self) -> bool {
        self.panel().toggle()
    }

    pub fn page_info(&self) -> PageInfo {
        let is_discussion = self.adapter.is_discussion_page();
        PageInfo {
            kind: if is_discussion {
                PageKind::Discussion
            } else {
                PageKind::Listing
            },
            platform: self.adapter.platform().as_str().to_string(),
            is_discussion,
            title: self.adapter.title(),
            url: self.page.url().to_string(),
            can_summarize: is_discussion,
        }
    }

    /// Answers one raw request from the shell. Never fails.
    pub async fn handle_message(&self, raw: &str) -> MessageResponse {
        let action = match parse_request(raw) {
            Ok(action) => action,
            Err(e) => {
                warn!("Unknown message action: {}", raw.trim());
                return MessageResponse::failure(&e);
            }
        };
        debug!("Handling {:?}", action);

        match action {
            Action::Summarize => match self.summarize_page().await {
                Ok(record) => MessageResponse::with_data(&record),
                Err(e) => MessageResponse::failure(&e),
            },
            Action::ToggleSidebar => {
                self.toggle_sidebar();
                MessageResponse::ok()
            }
            Action::GetPageInfo => MessageResponse::with_data(&self.page_info()),
        }
    }

    /// Tears the page view down. Results still in flight are discarded.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.adapter.destroy().await;
        self.panel().clear();
        info!("Session on {} destroyed", self.page.url());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::testing::RecordingDriver;
    use crate::summarizer::{
        Language, SummarizationError, SummaryClient, SummaryLength,
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};
    use url::Url;

    /// Echoes a short summary, failing for prompts that contain `fail_on`.
    #[derive(Default)]
    struct FakeSummarizer {
        fail_on: Option<&'static str>,
        delay: Option<Duration>,
        calls: Mutex<Vec<(String, Language)>>,
    }

    impl FakeSummarizer {
        fn calls(&self) -> Vec<(String, Language)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(
            &self,
            content: &str,
            language: Language,
            _length: SummaryLength,
        ) -> std::result::Result<String, SummarizationError> {
            self.calls
                .lock()
                .unwrap()
                .push((content.to_string(), language));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.fail_on {
                Some(marker) if content.contains(marker) => Err(SummarizationError::Upstream {
                    status: 500,
                    message: "model overloaded".into(),
                }),
                _ => Ok(format!("## Summary\n* {} chars", content.len())),
            }
        }
    }

    fn hn_row(id: &str, indent: usize, user: &str, text: &str) -> String {
        format!(
            r#"<tr class="athing comtr" id="{id}"><td><table><tr>
                 <td class="ind" indent="{indent}"></td>
                 <td><span class="comhead"><a class="hnuser">{user}</a></span>
                 <div class="commtext">{text}</div></td></tr></table></td></tr>"#
        )
    }

    fn hn_page() -> Arc<LivePage> {
        let html = format!(
            r#"<html><body><table class="fatitem"><tr><td>
                 <span class="titleline"><a href="https://example.com">Ask HN: Favourite crates?</a></span>
               </td></tr></table>
               <table class="comment-tree">{}{}{}</table></body></html>"#,
            hn_row("1", 0, "alice", "serde"),
            hn_row("2", 1, "bob", "agreed"),
            hn_row("3", 0, "carol", "bad take"),
        );
        Arc::new(LivePage::frozen(
            Url::parse("https://news.ycombinator.com/item?id=100").unwrap(),
            html,
        ))
    }

    fn settings() -> SummarySettings {
        SummarySettings {
            language: "english".into(),
            ..SummarySettings::default()
        }
    }

    async fn start(summarizer: Arc<FakeSummarizer>, settings: SummarySettings) -> Session {
        Session::start(
            hn_page(),
            RecordingDriver::new(),
            summarizer,
            settings,
            AdapterOptions::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_without_auto_summarize_makes_no_calls() {
        let summarizer = Arc::new(FakeSummarizer::default());
        let session = start(summarizer.clone(), settings()).await;
        assert!(summarizer.calls().is_empty());
        assert!(session.panel().main_summary().is_none());
    }

    #[tokio::test]
    async fn test_auto_summarize_fills_main_summary() {
        let summarizer = Arc::new(FakeSummarizer::default());
        let session = start(
            summarizer.clone(),
            SummarySettings {
                auto_summarize: true,
                ..settings()
            },
        )
        .await;

        assert_eq!(summarizer.calls().len(), 1);
        let panel = session.panel();
        let main = panel.main_summary().unwrap();
        assert_eq!(main.kind, SummaryKind::MainPost);
        assert_eq!(main.reply_count, 3);
        assert!(panel.is_visible());
    }

    #[tokio::test]
    async fn test_unsupported_site_is_rejected() {
        let page = Arc::new(LivePage::frozen(
            Url::parse("https://example.com/").unwrap(),
            "<html></html>",
        ));
        let result = Session::start(
            page,
            RecordingDriver::new(),
            Arc::new(FakeSummarizer::default()),
            settings(),
            AdapterOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(ThreadlineError::UnsupportedSite(_))));
    }

    #[tokio::test]
    async fn test_thread_failure_is_isolated() {
        let summarizer = Arc::new(FakeSummarizer {
            fail_on: Some("bad take"),
            ..FakeSummarizer::default()
        });
        let session = start(summarizer.clone(), settings()).await;

        let err = assert_err!(session.summarize_thread_by_id("3").await);
        assert_eq!(err.user_message(), "model overloaded");

        let record = assert_ok!(session.summarize_thread_by_id("1").await);
        assert_eq!(record.kind, SummaryKind::Thread);
        assert_eq!(record.author, "alice");
        assert_eq!(record.reply_count, 1);

        let panel = session.panel();
        assert_eq!(panel.affordance("3"), AffordanceState::Failed);
        assert_eq!(panel.affordance("1"), AffordanceState::Done);
        assert_eq!(panel.affordance("1").label(), "TL;DR ✓");
        assert!(panel.cached("1").is_some());
        assert!(panel.cached("3").is_none());
    }

    #[tokio::test]
    async fn test_resummarizing_overwrites_cache_entry() {
        let summarizer = Arc::new(FakeSummarizer::default());
        let session = start(summarizer, settings()).await;

        session.summarize_thread_by_id("1").await.unwrap();
        session.summarize_thread_by_id("3").await.unwrap();
        session.summarize_thread_by_id("1").await.unwrap();

        let panel = session.panel();
        let ids: Vec<&str> = panel.thread_summaries().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_unknown_thread_id_is_extraction_error() {
        let session = start(Arc::new(FakeSummarizer::default()), settings()).await;
        assert!(matches!(
            session.summarize_thread_by_id("2").await,
            Err(ThreadlineError::Extraction(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_id_summarizes_its_thread() {
        let reply = r##"<tr class="athing comtr" id="2"><td><table><tr>
                 <td class="ind" indent="1"></td>
                 <td><span class="comhead"><a class="hnuser">bob</a>
                 <span class="navs"> | <a href="#1">parent</a></span></span>
                 <div class="commtext">agreed</div></td></tr></table></td></tr>"##;
        let html = format!(
            r#"<html><body><table class="comment-tree">{}{}</table></body></html>"#,
            hn_row("1", 0, "alice", "serde"),
            reply,
        );
        let page = Arc::new(LivePage::frozen(
            Url::parse("https://news.ycombinator.com/item?id=100").unwrap(),
            html,
        ));
        let session = Session::start(
            page,
            RecordingDriver::new(),
            Arc::new(FakeSummarizer::default()),
            settings(),
            AdapterOptions::default(),
        )
        .await
        .unwrap();

        let record = assert_ok!(session.summarize_thread_by_id("2").await);
        assert_eq!(record.id, "1");
        assert_eq!(record.reply_count, 1);
    }

    #[tokio::test]
    async fn test_focus_thread_scrolls_and_highlights() {
        use crate::sites::testing::DriverCall;

        let driver = RecordingDriver::new();
        let session = Session::start(
            hn_page(),
            driver.clone(),
            Arc::new(FakeSummarizer::default()),
            settings(),
            AdapterOptions::default(),
        )
        .await
        .unwrap();

        session.focus_thread("3").await.unwrap();
        let calls = driver.calls();
        assert!(calls.contains(&DriverCall::Scroll(r#"tr[id="3"]"#.into())));
        assert!(calls.contains(&DriverCall::Highlight(r#"tr[id="3"]"#.into(), true)));

        assert!(session.focus_thread("404").await.is_err());
    }

    #[tokio::test]
    async fn test_message_protocol() {
        let session = start(Arc::new(FakeSummarizer::default()), settings()).await;

        let info = session.handle_message(r#""getPageInfo""#).await;
        assert!(info.success);
        let data = info.data.unwrap();
        assert_eq!(data["type"], "discussion");
        assert_eq!(data["isDiscussion"], true);
        assert_eq!(data["title"], "Ask HN: Favourite crates?");
        assert_eq!(data["canSummarize"], true);

        let toggled = session.handle_message(r#"{"action":"toggleSidebar"}"#).await;
        assert_eq!(toggled, MessageResponse::ok());
        assert!(session.panel().is_visible());

        let summarized = session.handle_message(r#"{"action":"summarize"}"#).await;
        assert!(summarized.success);
        assert_eq!(summarized.data.unwrap()["type"], "main_post");

        let unknown = session.handle_message(r#"{"action":"selfDestruct"}"#).await;
        assert!(!unknown.success);
        assert_eq!(unknown.error.as_deref(), Some("Unknown action"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_settings_hint() {
        let client = SummaryClient::new(&SummarySettings::default()).unwrap();
        let session = Session::start(
            hn_page(),
            RecordingDriver::new(),
            Arc::new(client),
            SummarySettings::default(),
            AdapterOptions::default(),
        )
        .await
        .unwrap();

        let response = session.handle_message(r#""summarize""#).await;
        assert!(!response.success);
        let error = response.error.unwrap();
        assert!(error.starts_with("AI service endpoint not configured"));
        assert!(error.contains("settings"));
        assert!(matches!(session.panel().status(), PanelStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_late_result_is_discarded_after_destroy() {
        let summarizer = Arc::new(FakeSummarizer {
            delay: Some(Duration::from_millis(50)),
            ..FakeSummarizer::default()
        });
        let session = Arc::new(start(summarizer, settings()).await);

        let task = tokio::spawn({
            let session = session.clone();
            async move { session.summarize_thread_by_id("1").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.destroy().await;
        session.destroy().await;

        assert!(task.await.unwrap().is_ok());
        let panel = session.panel();
        assert!(panel.thread_summaries().is_empty());
        assert_eq!(panel.affordance("1"), AffordanceState::Idle);
    }

    #[tokio::test]
    async fn test_quora_answers_use_answer_kind_and_prompt() {
        let html = r#"<html><body>
            <div class="q-text" id="mainContent_q"><span>Why Rust?</span></div>
            <div class="q-box" id="answer_1">
              <a class="q-box" href="/profile/Ferris">Ferris</a>
              <div class="q-text">Safety.</div>
            </div></body></html>"#;
        let page = Arc::new(LivePage::frozen(
            Url::parse("https://www.quora.com/Why-Rust").unwrap(),
            html,
        ));
        let summarizer = Arc::new(FakeSummarizer::default());
        let session = Session::start(
            page,
            RecordingDriver::new(),
            summarizer.clone(),
            settings(),
            AdapterOptions::default(),
        )
        .await
        .unwrap();

        let record = session.summarize_thread_by_id("answer_1").await.unwrap();
        assert_eq!(record.kind, SummaryKind::Answer);

        let (prompt, language) = summarizer.calls().pop().unwrap();
        assert!(prompt.starts_with("Question: Why Rust?"));
        assert_eq!(language, Language::Quora);
    }
}
