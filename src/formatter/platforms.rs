use crate::domain::{DiscussionContent, Thread};
use crate::formatter::{
    author_name, dedup_replies, has_content, reply_marker, ContentFormatter, ANSWER_INSTRUCTIONS,
    POST_INSTRUCTIONS, THREAD_INSTRUCTIONS,
};

const UNKNOWN: &str = "Unknown";
const ANONYMOUS: &str = "Anonymous";

/// Root line, reply count and indented replies, shared by the two
/// threaded platforms. `label` renders an author name.
fn threaded(thread: &Thread, label: fn(&str) -> String) -> String {
    let replies = dedup_replies(&thread.replies);
    let lines: Vec<String> = replies
        .iter()
        .map(|reply| {
            format!(
                "{}{}: {}",
                reply_marker(reply.depth),
                label(author_name(reply, UNKNOWN)),
                reply.text
            )
        })
        .collect();

    format!(
        "Thread started by {}:\n{}\n\nDiscussion ({} unique replies):\n{}\n\n{}",
        label(author_name(&thread.root, UNKNOWN)),
        thread.root.text,
        replies.len(),
        lines.join("\n\n"),
        THREAD_INSTRUCTIONS
    )
}

/// Every thread as a root line followed by its indented replies.
fn discussion_body(content: &DiscussionContent, label: fn(&str) -> String) -> String {
    let mut body = String::new();
    for thread in content.threads.iter().filter(|t| has_content(t)) {
        body.push_str(&format!(
            "\n{}: {}\n",
            label(author_name(&thread.root, UNKNOWN)),
            thread.root.text
        ));
        for reply in dedup_replies(&thread.replies) {
            body.push_str(&format!(
                "{}{}: {}\n",
                reply_marker(reply.depth),
                label(author_name(reply, UNKNOWN)),
                reply.text
            ));
        }
    }
    body
}

fn bracketed(author: &str) -> String {
    format!("[{author}]")
}

fn user_prefixed(author: &str) -> String {
    format!("u/{author}")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HackerNewsFormatter;

impl ContentFormatter for HackerNewsFormatter {
    fn format_thread(&self, thread: &Thread, _title: &str) -> String {
        threaded(thread, bracketed)
    }

    fn format_discussion(&self, content: &DiscussionContent) -> String {
        let post = &content.main_post;
        let mut out = format!("Title: {}\n", post.title);
        if let Some(url) = &post.url {
            out.push_str(&format!("URL: {url}\n"));
        }
        if let Some(author) = &post.author {
            out.push_str(&format!("Author: {author}\n"));
        }
        if let Some(text) = &post.text {
            out.push_str(&format!("\nContent:\n{text}\n"));
        }
        out.push_str(&format!(
            "\nDiscussion ({} comments):\n",
            content.comment_count()
        ));
        out.push_str(&discussion_body(content, bracketed));
        out.push('\n');
        out.push_str(POST_INSTRUCTIONS);
        out
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RedditFormatter;

impl ContentFormatter for RedditFormatter {
    fn format_thread(&self, thread: &Thread, _title: &str) -> String {
        threaded(thread, user_prefixed)
    }

    fn format_discussion(&self, content: &DiscussionContent) -> String {
        let post = &content.main_post;
        let mut out = format!("Title: {}\n", post.title);
        if let Some(author) = &post.author {
            out.push_str(&format!("Posted by u/{author}\n"));
        }
        if let Some(url) = &post.url {
            out.push_str(&format!("URL: {url}\n"));
        }
        out.push_str(&format!(
            "Content: {}\n",
            post.text.as_deref().unwrap_or("No content available")
        ));
        out.push_str(&format!(
            "\nDiscussion ({} comments):\n",
            content.comment_count()
        ));
        out.push_str(&discussion_body(content, user_prefixed));
        out.push('\n');
        out.push_str(POST_INSTRUCTIONS);
        out
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QuoraFormatter;

impl ContentFormatter for QuoraFormatter {
    fn format_thread(&self, thread: &Thread, title: &str) -> String {
        let comments = dedup_replies(&thread.replies);
        let mut out = format!(
            "Question: {}\n\nAnswer by {}:\n{}\n",
            title,
            author_name(&thread.root, ANONYMOUS),
            thread.root.text
        );
        if !comments.is_empty() {
            out.push_str(&format!("\nThis answer has {} comments.\n", comments.len()));
            for comment in comments {
                out.push_str(&format!(
                    "- [{}]: {}\n",
                    author_name(comment, ANONYMOUS),
                    comment.text
                ));
            }
        }
        out.push('\n');
        out.push_str(ANSWER_INSTRUCTIONS);
        out
    }

    fn format_discussion(&self, content: &DiscussionContent) -> String {
        let post = &content.main_post;
        let mut out = format!("Question: {}\n", post.title);
        if let Some(url) = &post.url {
            out.push_str(&format!("URL: {url}\n"));
        }
        if let Some(text) = &post.text {
            out.push_str(&format!("\nDetails: {text}\n"));
        }

        out.push_str("\nAnswers:\n");
        for (index, thread) in content.threads.iter().filter(|t| has_content(t)).enumerate() {
            out.push_str(&format!(
                "\n[Answer {} by {}]:\n{}\n",
                index + 1,
                author_name(&thread.root, ANONYMOUS),
                thread.root.text
            ));
            let comments = dedup_replies(&thread.replies);
            if !comments.is_empty() {
                out.push_str("\nComments on this answer:\n");
                for comment in comments {
                    out.push_str(&format!(
                        "- [{}]: {}\n",
                        author_name(comment, ANONYMOUS),
                        comment.text
                    ));
                }
            }
        }
        out.push('\n');
        out.push_str(POST_INSTRUCTIONS);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comment, MainPost};

    fn comment(id: &str, author: &str, text: &str, depth: usize) -> Comment {
        let mut c = Comment::new(id).with_author(author).with_text(text);
        c.depth = depth;
        c
    }

    fn thread(replies: Vec<Comment>) -> Thread {
        Thread {
            id: "r".into(),
            root: comment("r", "alice", "Rust is great", 0),
            replies,
        }
    }

    #[test]
    fn test_hn_thread_prompt_shape() {
        let prompt = HackerNewsFormatter.format_thread(
            &thread(vec![
                comment("a", "bob", "Agreed", 1),
                comment("b", "", "Nested", 2),
            ]),
            "ignored",
        );

        assert!(prompt.starts_with("Thread started by [alice]:\nRust is great\n"));
        assert!(prompt.contains("Discussion (2 unique replies):"));
        assert!(prompt.contains("  ↳ [bob]: Agreed"));
        assert!(prompt.contains("    ↳ [Unknown]: Nested"));
        assert!(prompt.ends_with(THREAD_INSTRUCTIONS));
    }

    #[test]
    fn test_duplicate_reply_formatted_once() {
        let prompt = HackerNewsFormatter.format_thread(
            &thread(vec![
                comment("dup", "bob", "same reply", 1),
                comment("x", "carol", "other", 1),
                comment("dup", "bob", "same reply", 1),
            ]),
            "",
        );
        assert_eq!(prompt.matches("same reply").count(), 1);
        assert!(prompt.contains("Discussion (2 unique replies):"));
    }

    #[test]
    fn test_reddit_uses_user_prefix() {
        let prompt =
            RedditFormatter.format_thread(&thread(vec![comment("a", "bob", "hi", 1)]), "");
        assert!(prompt.starts_with("Thread started by u/alice:"));
        assert!(prompt.contains("  ↳ u/bob: hi"));
    }

    #[test]
    fn test_blank_root_does_not_panic() {
        let blank = Thread {
            id: "x".into(),
            root: Comment::new("x"),
            replies: vec![],
        };
        assert!(blank.is_low_confidence());
        let prompt = RedditFormatter.format_thread(&blank, "");
        assert!(prompt.contains("u/Unknown"));

        let content = DiscussionContent {
            main_post: MainPost::new("T"),
            threads: vec![blank],
        };
        let page = HackerNewsFormatter.format_discussion(&content);
        assert!(!page.contains("[Unknown]"));
    }

    #[test]
    fn test_quora_answer_prompt() {
        let answer = Thread {
            id: "answer_1".into(),
            root: comment("answer_1", "", "Because of cargo.", 0),
            replies: vec![comment("answer_1-c0", "Bob", "Yes", 1)],
        };
        let prompt = QuoraFormatter.format_thread(&answer, "Why Rust?");
        assert!(prompt.starts_with("Question: Why Rust?\n\nAnswer by Anonymous:\nBecause of cargo.\n"));
        assert!(prompt.contains("This answer has 1 comments."));
        assert!(prompt.contains("- [Bob]: Yes"));
        assert!(prompt.ends_with(ANSWER_INSTRUCTIONS));
    }

    #[test]
    fn test_discussion_prompt_includes_post_and_threads() {
        let content = DiscussionContent {
            main_post: MainPost {
                url: Some("https://example.com".into()),
                author: Some("pg".into()),
                text: Some("Body".into()),
                ..MainPost::new("Show HN")
            },
            threads: vec![thread(vec![comment("a", "bob", "Agreed", 1)])],
        };
        let prompt = HackerNewsFormatter.format_discussion(&content);
        assert!(prompt.starts_with("Title: Show HN\nURL: https://example.com\nAuthor: pg\n"));
        assert!(prompt.contains("\nContent:\nBody\n"));
        assert!(prompt.contains("Discussion (2 comments):"));
        assert!(prompt.contains("[alice]: Rust is great\n  ↳ [bob]: Agreed"));
        assert!(prompt.ends_with(POST_INSTRUCTIONS));

        let reddit = RedditFormatter.format_discussion(&content);
        assert!(reddit.contains("Posted by u/pg"));
        assert!(reddit.contains("u/alice: Rust is great"));
    }
}
