//! Hacker News: comments are a flat run of table rows.
//!
//! Nesting is only visible as an indentation width on each row, 40px per
//! level (newer markup also carries an explicit `indent` attribute). A thread
//! is a root row plus every following comment row that is indented deeper,
//! up to the next row at the root's level or shallower.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::app::{Result, ThreadlineError};
use crate::domain::{Comment, DiscussionContent, MainPost, Thread, ThreadBuilder};
use crate::page::{dom, LivePage, PageDriver};
use crate::sites::binding::PageBinding;
use crate::sites::{AdapterOptions, CommentHandle, Platform, SiteAdapter};

/// Pixel width of one indentation level.
pub const INDENT_UNIT_PX: usize = 40;

const FALLBACK_TITLE: &str = "Hacker News Discussion";
const DELETED_AUTHOR: &str = "[deleted]";

static COMMENT_ROW: LazyLock<Selector> = LazyLock::new(|| dom::selector("tr.athing.comtr"));
static TREE_ROW: LazyLock<Selector> = LazyLock::new(|| dom::selector("table.comment-tree tr"));
static INDENT_CELL: LazyLock<Selector> = LazyLock::new(|| dom::selector("td.ind"));
static INDENT_IMG: LazyLock<Selector> = LazyLock::new(|| dom::selector(".ind img"));
static COMMTEXT: LazyLock<Selector> = LazyLock::new(|| dom::selector(".commtext"));
static USER: LazyLock<Selector> = LazyLock::new(|| dom::selector(".hnuser"));
static AGE: LazyLock<Selector> = LazyLock::new(|| dom::selector(".age"));
static SCORE: LazyLock<Selector> = LazyLock::new(|| dom::selector(".score"));
static NAV_LINK: LazyLock<Selector> = LazyLock::new(|| dom::selector(".navs a, .par a"));
static TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(".titleline > a, .storylink"));
static TOP_TEXT: LazyLock<Selector> = LazyLock::new(|| dom::selector(".toptext"));
static FAT_ITEM: LazyLock<Selector> = LazyLock::new(|| dom::selector(".fatitem"));

/// One row of the comment table, reduced to what segmentation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInfo {
    pub id: String,
    /// `None` for rows that are not comments (spacers, "more" links).
    pub indent: Option<usize>,
}

impl RowInfo {
    pub fn comment(id: impl Into<String>, indent: usize) -> Self {
        Self {
            id: id.into(),
            indent: Some(indent),
        }
    }

    pub fn other() -> Self {
        Self {
            id: String::new(),
            indent: None,
        }
    }
}

/// Replies of the thread rooted at `rows[root]`, as `(row index, relative depth)`.
///
/// Non-comment rows are skipped; the walk ends at the first comment row
/// indented no deeper than the root.
pub fn walk_thread(rows: &[RowInfo], root: usize) -> Vec<(usize, usize)> {
    let Some(root_indent) = rows.get(root).and_then(|r| r.indent) else {
        return Vec::new();
    };

    let mut replies = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(root + 1) {
        let Some(indent) = row.indent else {
            continue;
        };
        if indent <= root_indent {
            break;
        }
        replies.push((index, indent - root_indent));
    }
    replies
}

/// Groups a whole table into top-level threads in one pass.
///
/// Agrees with [`walk_thread`] for every root at indent zero: a thread runs
/// from its root to the next zero-indent comment row.
pub fn segment_rows(rows: &[RowInfo]) -> Vec<(usize, Vec<(usize, usize)>)> {
    let mut threads: Vec<(usize, Vec<(usize, usize)>)> = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match row.indent {
            None => {}
            Some(0) => threads.push((index, Vec::new())),
            Some(indent) => {
                if let Some((_, replies)) = threads.last_mut() {
                    replies.push((index, indent));
                }
            }
        }
    }
    threads
}

pub struct HackerNewsAdapter {
    binding: PageBinding,
}

impl HackerNewsAdapter {
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

    /// Ancestors of a comment, root-most first, found by following each
    /// row's `parent` link. Depths are the native indent levels.
    pub fn comment_chain(&self, id: &str) -> Vec<Comment> {
        self.binding.page.with_document(|doc| {
            let mut chain = Vec::new();
            let mut visited = HashSet::from([id.to_string()]);
            let mut current = find_row(doc, id);

            while let Some(row) = current {
                let Some(parent_id) = parent_link(row) else {
                    break;
                };
                if !visited.insert(parent_id.clone()) {
                    break;
                }
                let Some(parent) = find_row(doc, &parent_id) else {
                    break;
                };
                let mut comment = parse_row(parent);
                comment.depth = indent_level(parent);
                chain.push(comment);
                current = Some(parent);
            }

            chain.reverse();
            chain
        })
    }

    fn main_post(&self, doc: &Html) -> MainPost {
        let fat_item = doc.select(&FAT_ITEM).next();
        let scoped = |selector: &Selector| {
            fat_item.and_then(|item| dom::first_text(item, selector))
        };

        let url = doc
            .select(&TITLE_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| self.binding.page.url().join(href).ok())
            .map(|u| u.to_string());

        MainPost {
            title: title_of(doc),
            url,
            text: doc
                .select(&TOP_TEXT)
                .next()
                .map(dom::text_content)
                .filter(|t| !t.is_empty()),
            author: scoped(&USER),
            timestamp: fat_item
                .and_then(|item| item.select(&AGE).next())
                .map(age_of),
        }
    }
}

fn title_of(doc: &Html) -> String {
    doc.select(&TITLE_LINK)
        .next()
        .map(dom::text_content)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Indent level of a comment row.
pub fn indent_level(row: ElementRef<'_>) -> usize {
    if let Some(level) = row
        .select(&INDENT_CELL)
        .next()
        .and_then(|cell| cell.value().attr("indent"))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        return level;
    }

    row.select(&INDENT_IMG)
        .next()
        .and_then(|img| img.value().attr("width"))
        .and_then(|w| w.trim().parse::<usize>().ok())
        .map(|width| width / INDENT_UNIT_PX)
        .unwrap_or(0)
}

fn is_comment_row(row: ElementRef<'_>) -> bool {
    dom::has_class(row, "comtr")
}

fn row_info(row: ElementRef<'_>) -> RowInfo {
    if is_comment_row(row) {
        RowInfo::comment(row.value().id().unwrap_or_default(), indent_level(row))
    } else {
        RowInfo::other()
    }
}

fn age_of(age: ElementRef<'_>) -> String {
    dom::attr(age, "title").unwrap_or_else(|| dom::text_content(age))
}

fn parse_row(row: ElementRef<'_>) -> Comment {
    Comment {
        id: row.value().id().unwrap_or_default().to_string(),
        author: dom::first_text(row, &USER).unwrap_or_else(|| DELETED_AUTHOR.to_string()),
        text: dom::first_text(row, &COMMTEXT).unwrap_or_default(),
        timestamp: row.select(&AGE).next().map(age_of).unwrap_or_default(),
        score: dom::first_text(row, &SCORE),
        depth: 0,
    }
}

fn find_row<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    doc.select(&COMMENT_ROW)
        .find(|row| row.value().id() == Some(id))
}

fn parent_link(row: ElementRef<'_>) -> Option<String> {
    let href = row
        .select(&NAV_LINK)
        .find(|a| dom::text_content(*a) == "parent")?
        .value()
        .attr("href")?;

    let id = match href.split_once("id=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or(rest),
        None => href.trim_start_matches('#'),
    };
    (!id.is_empty()).then(|| id.to_string())
}

fn top_level_rows(doc: &Html) -> Vec<CommentHandle> {
    doc.select(&COMMENT_ROW)
        .filter(|row| indent_level(*row) == 0)
        .filter_map(|row| row.value().id().map(|id| CommentHandle::new(id, 0)))
        .collect()
}

fn row_selector(id: &str) -> String {
    dom::attr_selector("tr", "id", id)
}

fn build_thread(
    rows: &[ElementRef<'_>],
    infos: &[RowInfo],
    root: usize,
    replies: &[(usize, usize)],
) -> Thread {
    let root_indent = infos[root].indent.unwrap_or(0);
    let mut builder = ThreadBuilder::new(parse_row(rows[root]), root_indent);
    for &(index, relative) in replies {
        builder.push_reply(parse_row(rows[index]), root_indent + relative);
    }
    builder.build()
}

#[async_trait]
impl SiteAdapter for HackerNewsAdapter {
    fn platform(&self) -> Platform {
        Platform::HackerNews
    }

    async fn initialize(&self) -> Result<()> {
        self.binding.install_style().await?;
        if self.is_discussion_page() {
            let handles = self.top_level_comments();
            let added = self.binding.augment(&handles, row_selector).await;
            info!("Hacker News adapter ready, {} top-level comments", added);
        }
        Ok(())
    }

    fn is_discussion_page(&self) -> bool {
        self.binding.page.path().starts_with("/item")
    }

    fn title(&self) -> String {
        self.binding.page.with_document(title_of)
    }

    fn top_level_comments(&self) -> Vec<CommentHandle> {
        self.binding.page.with_document(top_level_rows)
    }

    /// Follows parent links up from a nested comment to its thread root.
    fn thread_root(&self, id: &str) -> Option<CommentHandle> {
        let root_id = match self.comment_chain(id).first() {
            Some(ancestor) => ancestor.id.clone(),
            None => id.to_string(),
        };
        self.top_level_comments()
            .into_iter()
            .find(|h| h.id == root_id)
    }

    async fn parse_comment_thread(&self, root: &CommentHandle) -> Result<Thread> {
        self.binding.page.with_document(|doc| {
            let root_row = find_row(doc, &root.id).ok_or_else(|| {
                ThreadlineError::Extraction(format!("Comment row {} not found", root.id))
            })?;

            let rows: Vec<ElementRef<'_>> = std::iter::once(root_row)
                .chain(dom::next_element_siblings(root_row))
                .collect();
            let infos: Vec<RowInfo> = rows.iter().map(|r| row_info(*r)).collect();
            let replies = walk_thread(&infos, 0);

            debug!("Thread {} has {} replies", root.id, replies.len());
            Ok(build_thread(&rows, &infos, 0, &replies))
        })
    }

    async fn page_content(&self) -> Result<DiscussionContent> {
        if !self.is_discussion_page() {
            return Err(ThreadlineError::Extraction(
                "Not a Hacker News item page".to_string(),
            ));
        }

        self.binding.page.with_document(|doc| {
            let mut rows: Vec<ElementRef<'_>> = doc.select(&TREE_ROW).collect();
            if rows.is_empty() {
                rows = doc.select(&COMMENT_ROW).collect();
            }
            let infos: Vec<RowInfo> = rows.iter().map(|r| row_info(*r)).collect();

            let threads = segment_rows(&infos)
                .iter()
                .map(|(root, replies)| build_thread(&rows, &infos, *root, replies))
                .collect();

            Ok(DiscussionContent {
                main_post: self.main_post(doc),
                threads,
            })
        })
    }

    async fn scroll_to_comment(&self, id: &str) -> Result<()> {
        let exists = self
            .binding
            .page
            .with_document(|doc| find_row(doc, id).is_some());
        if !exists {
            return Err(ThreadlineError::Extraction(format!("Comment {} not found", id)));
        }
        self.binding.scroll_and_highlight(&row_selector(id)).await
    }

    async fn destroy(&self) {
        self.binding.release().await;
    }
}
