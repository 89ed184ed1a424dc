use serde::{Deserialize, Serialize};

use crate::summarizer::{Language, SummaryLength};

/// Settings for the summarization endpoint.
///
/// Keys keep the names the options page stores them under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummarySettings {
    /// Provider label; only `custom` endpoints are called
    pub ai_provider: String,

    /// Bearer token sent with every request
    pub api_key: String,

    /// Full URL of the chat-completions style endpoint
    pub endpoint: String,

    pub model: String,

    /// `short`, `medium` or `long`
    pub summary_length: String,

    /// `chinese`, `japanese`, `korean`, `quora` or anything else for English
    pub language: String,

    /// Summarize the main post as soon as a discussion page is opened
    pub auto_summarize: bool,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            ai_provider: "custom".to_string(),
            api_key: String::new(),
            endpoint: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            summary_length: "medium".to_string(),
            language: "chinese".to_string(),
            auto_summarize: false,
        }
    }
}

impl SummarySettings {
    pub fn language(&self) -> Language {
        Language::from(self.language.as_str())
    }

    pub fn length(&self) -> SummaryLength {
        SummaryLength::from(self.summary_length.as_str())
    }

    /// True when both the endpoint and the credential are present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}
