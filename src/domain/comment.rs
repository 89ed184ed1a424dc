use serde::{Deserialize, Serialize};

/// One contribution to a discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    /// Platform display string, never normalized.
    pub timestamp: String,
    pub score: Option<String>,
    /// Nesting depth relative to the thread root (0 = root).
    pub depth: usize,
}

impl Comment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: String::new(),
            text: String::new(),
            timestamp: String::new(),
            score: None,
            depth: 0,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// True when nothing useful could be read for this comment.
    pub fn is_blank(&self) -> bool {
        self.author.trim().is_empty() && self.text.trim().is_empty()
    }
}

/// A root comment plus its flattened descendant replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub root: Comment,
    pub replies: Vec<Comment>,
}

impl Thread {
    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }

    /// A thread whose root could not be parsed is kept, but flagged.
    pub fn is_low_confidence(&self) -> bool {
        self.root.is_blank()
    }
}

/// Assembles a [`Thread`] from comments that carry their native depth.
///
/// Replies whose native depth is not strictly greater than the root's belong
/// to a sibling thread and are rejected.
#[derive(Debug)]
pub struct ThreadBuilder {
    root_depth: usize,
    thread: Thread,
}

impl ThreadBuilder {
    pub fn new(mut root: Comment, root_depth: usize) -> Self {
        root.depth = 0;
        Self {
            root_depth,
            thread: Thread {
                id: root.id.clone(),
                root,
                replies: Vec::new(),
            },
        }
    }

    /// Adds a reply, returning false if it is not a descendant of the root.
    pub fn push_reply(&mut self, mut reply: Comment, native_depth: usize) -> bool {
        if native_depth <= self.root_depth {
            return false;
        }
        reply.depth = native_depth - self.root_depth;
        self.thread.replies.push(reply);
        true
    }

    pub fn build(self) -> Thread {
        self.thread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_relative_depth() {
        let mut builder = ThreadBuilder::new(Comment::new("r").with_author("a"), 2);
        assert!(builder.push_reply(Comment::new("c1"), 3));
        assert!(builder.push_reply(Comment::new("c2"), 5));
        let thread = builder.build();

        assert_eq!(thread.id, "r");
        assert_eq!(thread.root.depth, 0);
        assert_eq!(thread.replies[0].depth, 1);
        assert_eq!(thread.replies[1].depth, 3);
    }

    #[test]
    fn test_builder_rejects_non_descendants() {
        let mut builder = ThreadBuilder::new(Comment::new("r"), 1);
        assert!(!builder.push_reply(Comment::new("sibling"), 1));
        assert!(!builder.push_reply(Comment::new("ancestor"), 0));
        assert_eq!(builder.build().reply_count(), 0);
    }

    #[test]
    fn test_blank_root_is_low_confidence() {
        let thread = ThreadBuilder::new(Comment::new("x"), 0).build();
        assert!(thread.is_low_confidence());

        let thread = ThreadBuilder::new(Comment::new("x").with_text("hello"), 0).build();
        assert!(!thread.is_low_confidence());
    }
}
