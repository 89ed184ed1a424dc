use serde::{Deserialize, Serialize};

use super::Thread;

/// The root of the whole discussion: a story, a post or a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPost {
    pub title: String,
    pub url: Option<String>,
    pub text: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<String>,
}

impl MainPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionContent {
    pub main_post: MainPost,
    pub threads: Vec<Thread>,
}

impl DiscussionContent {
    pub fn comment_count(&self) -> usize {
        self.threads.iter().map(|t| 1 + t.reply_count()).sum()
    }
}
