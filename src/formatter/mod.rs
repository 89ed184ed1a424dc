//! Prompt text for the language model.
//!
//! One [`ContentFormatter`] per platform. Formatting is a pure function of
//! the extracted model: replies are deduplicated by id, authors never come
//! out empty, nesting is shown with a depth-scaled `↳` marker, and a fixed
//! instruction block is appended after the discussion body.

mod platforms;

pub use platforms::{HackerNewsFormatter, QuoraFormatter, RedditFormatter};

use std::collections::HashSet;

use crate::domain::{Comment, DiscussionContent, Thread};
use crate::sites::Platform;

/// Appended to every per-thread prompt.
pub const THREAD_INSTRUCTIONS: &str = "Please analyze this discussion thread focusing on:
1. Main points and arguments made
2. Key insights and unique perspectives
3. Areas of consensus or disagreements
4. Notable conclusions";

/// Appended to every whole-page prompt.
pub const POST_INSTRUCTIONS: &str = "Please provide a comprehensive summary focusing on:
1. Main topic and key points from the original post
2. Major themes and insights from the discussion
3. Significant agreements or disagreements
4. Overall conclusions and important takeaways";

/// Appended to a single Quora answer.
pub const ANSWER_INSTRUCTIONS: &str = "Please summarize focusing on:
1. Main points and arguments
2. Key insights
3. Evidence or examples provided";

pub trait ContentFormatter: Send + Sync {
    /// Prompt for one thread. `title` is the page title, used where the
    /// platform needs the question for context.
    fn format_thread(&self, thread: &Thread, title: &str) -> String;

    /// Prompt for the main post and all of its threads.
    fn format_discussion(&self, content: &DiscussionContent) -> String;
}

pub fn formatter_for(platform: Platform) -> &'static dyn ContentFormatter {
    match platform {
        Platform::HackerNews => &HackerNewsFormatter,
        Platform::Reddit => &RedditFormatter,
        Platform::Quora => &QuoraFormatter,
    }
}

/// Drops replies whose id was already seen, keeping first-seen order.
pub fn dedup_replies(replies: &[Comment]) -> Vec<&Comment> {
    let mut seen = HashSet::new();
    replies
        .iter()
        .filter(|reply| seen.insert(reply.id.as_str()))
        .collect()
}

/// The comment's author, or `fallback` when it is blank.
pub fn author_name<'a>(comment: &'a Comment, fallback: &'a str) -> &'a str {
    let author = comment.author.trim();
    if author.is_empty() {
        fallback
    } else {
        author
    }
}

/// Two spaces per level of relative depth, then the reply marker.
pub fn reply_marker(depth: usize) -> String {
    format!("{}↳ ", "  ".repeat(depth.max(1)))
}

/// Threads worth sending: blank low-confidence roots without replies are
/// left out of whole-page prompts.
fn has_content(thread: &Thread) -> bool {
    !thread.root.text.trim().is_empty() || !thread.replies.is_empty()
}
