//! Reddit: `shreddit-comment` custom elements.
//!
//! Nesting is given by each host's `depth` attribute. Bodies live behind a
//! shadow root that the host attaches some time after it is inserted. Content
//! reads wait, in one pass over each published snapshot, until every host they
//! cover is attached. A frozen page falls back to the light-DOM slot.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::app::{Result, ThreadlineError};
use crate::domain::{Comment, DiscussionContent, MainPost, Thread, ThreadBuilder};
use crate::page::{dom, poll_until, LivePage, PageDriver, PollPolicy};
use crate::sites::binding::PageBinding;
use crate::sites::{AdapterOptions, CommentHandle, Platform, SiteAdapter};

const FALLBACK_TITLE: &str = "Reddit Discussion";
const DELETED_AUTHOR: &str = "[deleted]";
const HOST_TAG: &str = "shreddit-comment";

/// Bodies that mark a removed comment.
const DELETED_BODIES: [&str; 2] = ["[deleted]", "[removed]"];

static COMMENT: LazyLock<Selector> = LazyLock::new(|| dom::selector(HOST_TAG));
static SHADOW_BODY: LazyLock<Selector> = LazyLock::new(|| dom::selector(".comment-body"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| dom::selector("h1"));
static POST: LazyLock<Selector> = LazyLock::new(|| dom::selector("shreddit-post"));
static POST_BODY: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"[slot="text-body"]"#));

pub struct RedditAdapter {
    binding: PageBinding,
}

impl RedditAdapter {
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

    fn poll_policy(&self) -> PollPolicy {
        if self.binding.page.is_frozen() {
            PollPolicy {
                max_attempts: 1,
                ..self.binding.options.poll
            }
        } else {
            self.binding.options.poll
        }
    }

    fn main_post(&self, doc: &Html) -> MainPost {
        let post = doc.select(&POST).next();
        MainPost {
            title: title_of(doc),
            url: Some(self.binding.page.url().to_string()),
            text: post
                .and_then(|p| p.select(&POST_BODY).next())
                .map(|body| dom::squash_whitespace(&dom::text_content(body)))
                .filter(|t| !t.is_empty()),
            author: post.and_then(|p| dom::attr(p, "author")),
            timestamp: post.and_then(|p| dom::attr(p, "created-timestamp")),
        }
    }
}

fn title_of(doc: &Html) -> String {
    doc.select(&HEADING)
        .next()
        .map(dom::text_content)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.select(&POST)
                .next()
                .and_then(|p| dom::attr(p, "post-title"))
        })
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

fn comment_id(host: ElementRef<'_>) -> Option<String> {
    dom::attr(host, "thingid").or_else(|| host.value().id().map(String::from))
}

fn find_host<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    doc.select(&COMMENT)
        .find(|host| comment_id(*host).as_deref() == Some(id))
}

/// The `depth` attribute, or the number of enclosing comment hosts.
fn native_depth(host: ElementRef<'_>) -> usize {
    dom::attr(host, "depth")
        .and_then(|d| d.parse().ok())
        .unwrap_or_else(|| {
            host.ancestors()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == HOST_TAG)
                .count()
        })
}

/// The host's own `[slot="comment"]` child, never a nested reply's.
fn light_body(host: ElementRef<'_>) -> Option<String> {
    dom::child_elements(host)
        .find(|child| child.value().attr("slot") == Some("comment"))
        .map(|slot| dom::squash_whitespace(&dom::text_content(slot)))
}

fn shadow_body(host: ElementRef<'_>, shadow: ElementRef<'_>) -> String {
    shadow
        .select(&SHADOW_BODY)
        .next()
        .map(|body| dom::squash_whitespace(&dom::text_content(body)))
        .or_else(|| light_body(host))
        .unwrap_or_default()
}

/// Body text of a host. `None` while the shadow root is still required but
/// not attached yet.
fn read_body(host: ElementRef<'_>, require_shadow: bool) -> Option<String> {
    match dom::shadow_root(host) {
        Some(shadow) => Some(shadow_body(host, shadow)),
        None if require_shadow => None,
        None => Some(light_body(host).unwrap_or_default()),
    }
}

fn is_deleted(host: ElementRef<'_>) -> bool {
    read_body(host, false).is_some_and(|body| DELETED_BODIES.contains(&body.as_str()))
}

fn read_comment(host: ElementRef<'_>, id: String, require_shadow: bool) -> Option<Comment> {
    Some(Comment {
        id,
        author: dom::attr(host, "author").unwrap_or_else(|| DELETED_AUTHOR.to_string()),
        text: read_body(host, require_shadow)?,
        timestamp: dom::attr(host, "created-timestamp").unwrap_or_default(),
        score: dom::attr(host, "score"),
        depth: 0,
    })
}

/// The thread rooted at `host`, or `None` if any comment in it still waits
/// for its shadow root.
fn read_thread(host: ElementRef<'_>, id: String, require_shadow: bool) -> Option<Thread> {
    let root_depth = native_depth(host);
    let mut builder = ThreadBuilder::new(read_comment(host, id, require_shadow)?, root_depth);

    for reply in host.select(&COMMENT) {
        let Some(reply_id) = comment_id(reply) else {
            continue;
        };
        let depth = native_depth(reply);
        if depth <= root_depth {
            debug!("Skipping {} at depth {} under root depth {}", reply_id, depth, root_depth);
            continue;
        }
        builder.push_reply(read_comment(reply, reply_id, require_shadow)?, depth);
    }
    Some(builder.build())
}

fn thread_in(doc: &Html, id: &str, require_shadow: bool) -> Option<Result<Thread>> {
    match find_host(doc, id) {
        None => Some(Err(ThreadlineError::Extraction(format!("Comment {} not found", id)))),
        Some(host) => read_thread(host, id.to_string(), require_shadow).map(Ok),
    }
}

/// Every top-level thread, or `None` while any of them is not fully attached.
fn threads_in(doc: &Html, require_shadow: bool) -> Option<Vec<Thread>> {
    let mut threads = Vec::new();
    for host in top_level_elements(doc) {
        if require_shadow && dom::shadow_root(host).is_none() {
            return None;
        }
        if is_deleted(host) {
            continue;
        }
        let Some(id) = comment_id(host) else {
            continue;
        };
        threads.push(read_thread(host, id, require_shadow)?);
    }
    Some(threads)
}

fn top_level_elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.select(&COMMENT).filter(|host| native_depth(*host) == 0)
}

fn top_level_hosts(doc: &Html) -> Vec<CommentHandle> {
    top_level_elements(doc)
        .filter(|host| !is_deleted(*host))
        .filter_map(|host| comment_id(host).map(|id| CommentHandle::new(id, 0)))
        .collect()
}

fn has_comments(doc: &Html) -> bool {
    doc.select(&COMMENT).next().is_some()
}

fn host_selector(id: &str) -> String {
    format!(
        "{}, {}",
        dom::attr_selector(HOST_TAG, "thingid", id),
        dom::attr_selector(HOST_TAG, "id", id)
    )
}

#[async_trait]
impl SiteAdapter for RedditAdapter {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn initialize(&self) -> Result<()> {
        self.binding.install_style().await?;
        if !self.is_discussion_page() {
            return Ok(());
        }

        let page = &self.binding.page;
        let outcome = poll_until(self.poll_policy(), || page.with_document(has_comments)).await;
        if !outcome.is_ready() {
            warn!("No Reddit comments appeared, continuing with what is loaded");
        }

        let handles = self.top_level_comments();
        self.binding.augment(&handles, host_selector).await;
        self.binding.observe(top_level_hosts, host_selector);
        info!("Reddit adapter ready, {} top-level comments", handles.len());
        Ok(())
    }

    fn is_discussion_page(&self) -> bool {
        self.binding.page.path().contains("/comments/")
    }

    fn title(&self) -> String {
        self.binding.page.with_document(title_of)
    }

    fn top_level_comments(&self) -> Vec<CommentHandle> {
        self.binding.page.with_document(top_level_hosts)
    }

    async fn parse_comment_thread(&self, root: &CommentHandle) -> Result<Thread> {
        let page = &self.binding.page;
        match page.wait_until(|doc| thread_in(doc, &root.id, true)).await {
            Some(thread) => thread,
            None => {
                debug!("Page frozen before {} attached its shadow roots", root.id);
                page.with_document(|doc| thread_in(doc, &root.id, false))
                    .unwrap_or_else(|| {
                        Err(ThreadlineError::Extraction(format!("Comment {} not found", root.id)))
                    })
            }
        }
    }

    async fn page_content(&self) -> Result<DiscussionContent> {
        if !self.is_discussion_page() {
            return Err(ThreadlineError::Extraction(
                "Not a Reddit comments page".to_string(),
            ));
        }

        let page = &self.binding.page;
        let threads = match page.wait_until(|doc| threads_in(doc, true)).await {
            Some(threads) => threads,
            None => {
                debug!("Page frozen before every comment attached its shadow root");
                page.with_document(|doc| threads_in(doc, false))
                    .unwrap_or_default()
            }
        };
        let main_post = page.with_document(|doc| self.main_post(doc));
        Ok(DiscussionContent { main_post, threads })
    }

    async fn scroll_to_comment(&self, id: &str) -> Result<()> {
        let exists = self
            .binding
            .page
            .with_document(|doc| find_host(doc, id).is_some());
        if !exists {
            return Err(ThreadlineError::Extraction(format!("Comment {} not found", id)));
        }
        self.binding.scroll_and_highlight(&host_selector(id)).await
    }

    async fn destroy(&self) {
        self.binding.release().await;
    }
}
