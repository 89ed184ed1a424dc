//! Quora: answer cards under a question.
//!
//! Every answer is a top-level thread. Its replies are the comment items of
//! the comments container inside the card, all at depth 1. A card without
//! that container has no replies.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::app::{Result, ThreadlineError};
use crate::domain::{Comment, DiscussionContent, MainPost, Thread, ThreadBuilder};
use crate::page::{dom, LivePage, PageDriver};
use crate::sites::binding::PageBinding;
use crate::sites::{AdapterOptions, CommentHandle, Platform, SiteAdapter};

const FALLBACK_TITLE: &str = "Quora Discussion";
const ANONYMOUS: &str = "Anonymous";

static ANSWER: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"div[class*="q-box"][id^="answer_"]"#));
static TEXT: LazyLock<Selector> = LazyLock::new(|| dom::selector(r#"div[class*="q-text"]"#));
static AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"a[class*="q-box"][href^="/profile/"]"#));
static UPVOTES: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"div[class*="q-text"][class*="qu-color--gray"]"#));
static COMMENTS: LazyLock<Selector> = LazyLock::new(|| {
    dom::selector(
        r#"div[class*="q-box"][class*="qu-mt--medium"] div[class*="q-box"][class*="qu-borderTop"]"#,
    )
});
static COMMENT_ITEM: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"div[class*="q-box"][class*="qu-pt--medium"]"#));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"div[class*="q-text"][id^="mainContent"] span"#));
static DETAILS: LazyLock<Selector> = LazyLock::new(|| {
    dom::selector(r#"div[class*="q-box"][class*="qu-mt--small"] div[class*="q-text"]"#)
});
static QUESTION_CARD: LazyLock<Selector> = LazyLock::new(|| dom::selector(".q-box.qu-borderAll"));

pub struct QuoraAdapter {
    binding: PageBinding,
}

impl QuoraAdapter {
    pub fn new(page: Arc<LivePage>, driver: Arc<dyn PageDriver>, options: AdapterOptions) -> Self {
        Self {
            binding: PageBinding::new(page, driver, options),
        }
    }

    pub fn boxed(
        page: Arc<LivePage>,
        driver: Arc<dyn PageDriver>,
        options: AdapterOptions,
    ) -> Box<dyn SiteAdapter> {
        Box::new(Self::new(page, driver, options))
    }
}

fn title_of(doc: &Html) -> String {
    doc.select(&TITLE)
        .next()
        .map(dom::text_content)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

fn find_answer<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    doc.select(&ANSWER).find(|a| a.value().id() == Some(id))
}

fn author_of(element: ElementRef<'_>) -> String {
    dom::first_text(element, &AUTHOR).unwrap_or_else(|| ANONYMOUS.to_string())
}

/// First text block that is not the grey upvote line.
fn body_of(element: ElementRef<'_>) -> String {
    element
        .select(&TEXT)
        .find(|t| !t.value().classes().any(|c| c.contains("qu-color--gray")))
        .map(dom::text_content)
        .unwrap_or_default()
}

/// Comments under an answer card. Empty when the comments container cannot
/// be found, which is indistinguishable from an answer nobody commented on.
fn comment_items(answer: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    answer
        .select(&COMMENTS)
        .next()
        .map(|container| container.select(&COMMENT_ITEM).collect())
        .unwrap_or_default()
}

fn parse_answer(answer: ElementRef<'_>) -> Thread {
    let answer_id = answer.value().id().unwrap_or_default().to_string();

    let mut root = Comment::new(answer_id.clone())
        .with_author(author_of(answer))
        .with_text(body_of(answer));
    root.score = dom::first_text(answer, &UPVOTES);

    let mut builder = ThreadBuilder::new(root, 0);
    for (index, item) in comment_items(answer).into_iter().enumerate() {
        let id = item
            .value()
            .id()
            .map(String::from)
            .unwrap_or_else(|| format!("{answer_id}-c{index}"));
        let reply = Comment::new(id)
            .with_author(author_of(item))
            .with_text(body_of(item));
        builder.push_reply(reply, 1);
    }
    builder.build()
}

fn answer_cards(doc: &Html) -> Vec<CommentHandle> {
    doc.select(&ANSWER)
        .filter_map(|a| a.value().id().map(|id| CommentHandle::new(id, 0)))
        .collect()
}

fn answer_selector(id: &str) -> String {
    dom::attr_selector("div", "id", id)
}

#[async_trait]
impl SiteAdapter for QuoraAdapter {
    fn platform(&self) -> Platform {
        Platform::Quora
    }

    async fn initialize(&self) -> Result<()> {
        self.binding.install_style().await?;
        if !self.is_discussion_page() {
            return Ok(());
        }
        let handles = self.top_level_comments();
        self.binding.augment(&handles, answer_selector).await;
        self.binding.observe(answer_cards, answer_selector);
        info!("Quora adapter ready, {} answers", handles.len());
        Ok(())
    }

    fn is_discussion_page(&self) -> bool {
        self.binding.page.path().contains("/answer/")
            || self.binding.page.with_document(|doc| {
                doc.select(&QUESTION_CARD).next().is_some() || doc.select(&ANSWER).next().is_some()
            })
    }

    fn title(&self) -> String {
        self.binding.page.with_document(title_of)
    }

    fn top_level_comments(&self) -> Vec<CommentHandle> {
        self.binding.page.with_document(answer_cards)
    }

    async fn parse_comment_thread(&self, root: &CommentHandle) -> Result<Thread> {
        self.binding.page.with_document(|doc| {
            let answer = find_answer(doc, &root.id).ok_or_else(|| {
                ThreadlineError::Extraction(format!("Answer {} not found", root.id))
            })?;
            let thread = parse_answer(answer);
            debug!("Answer {} has {} comments", root.id, thread.reply_count());
            Ok(thread)
        })
    }

    async fn page_content(&self) -> Result<DiscussionContent> {
        if !self.is_discussion_page() {
            return Err(ThreadlineError::Extraction(
                "Not a Quora question page".to_string(),
            ));
        }

        let url = self.binding.page.url().to_string();
        Ok(self.binding.page.with_document(|doc| DiscussionContent {
            main_post: MainPost {
                url: Some(url),
                text: doc
                    .select(&DETAILS)
                    .next()
                    .map(dom::text_content)
                    .filter(|t| !t.is_empty()),
                ..MainPost::new(title_of(doc))
            },
            threads: doc.select(&ANSWER).map(parse_answer).collect(),
        }))
    }

    async fn scroll_to_comment(&self, id: &str) -> Result<()> {
        let exists = self
            .binding
            .page
            .with_document(|doc| find_answer(doc, id).is_some());
        if !exists {
            return Err(ThreadlineError::Extraction(format!("Answer {} not found", id)));
        }
        self.binding.scroll_and_highlight(&answer_selector(id)).await
    }

    async fn destroy(&self) {
        self.binding.release().await;
    }
}
