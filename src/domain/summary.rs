use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    MainPost,
    Thread,
    Comment,
    Answer,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainPost => "main_post",
            Self::Thread => "thread",
            Self::Comment => "comment",
            Self::Answer => "answer",
        }
    }
}

/// A generated summary, cached for the lifetime of a page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SummaryKind,
    pub summary_text: String,
    pub author: String,
    pub reply_count: usize,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn new(
        id: impl Into<String>,
        kind: SummaryKind,
        summary_text: impl Into<String>,
        author: impl Into<String>,
        reply_count: usize,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            summary_text: summary_text.into(),
            author: author.into(),
            reply_count,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = SummaryRecord::new("42", SummaryKind::MainPost, "text", "pg", 3);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "main_post");
        assert_eq!(json["summaryText"], "text");
        assert_eq!(json["replyCount"], 3);
        assert!(json.get("createdAt").is_some());
    }
}
