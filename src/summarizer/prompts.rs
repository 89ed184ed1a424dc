use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sites::Platform;

const CHINESE_PROMPT: &str = "你是一个专业的讨论帖总结助手。请以中文总结讨论内容，注重提取关键观点、主要论据和讨论结果。总结应该清晰、准确、全面。回复格式：\n1. 主要观点：\n2. 关键见解：\n3. 讨论结果：";

const JAPANESE_PROMPT: &str = "あなたは専門的な議論要約アシスタントです。議論の内容を日本語で要約し、重要なポイント、主な論点、議論の結果に焦点を当ててください。要約は明確で、正確で、包括的である必要があります。";

const KOREAN_PROMPT: &str = "당신은 전문적인 토론 요약 도우미입니다. 토론 내용을 한국어로 요약하고, 주요 논점, 주요 논거, 토론 결과를 중심으로 정리해 주세요. 요약은 명확하고 정확하며 포괄적이어야 합니다.";

const QUORA_PROMPT: &str = "You are a professional Quora answer summarizer. Please create a concise summary that captures the key information, insights, and evidence from the answer. Format your response as:\n1. Main Points:\n2. Key Insights:\n3. Examples or Evidence:";

const ENGLISH_PROMPT: &str = "You are a professional discussion summarizer. Please summarize the discussion clearly, accurately, and comprehensively, focusing on key points, main arguments, and discussion outcomes. Format your response as:\n1. Main Points:\n2. Key Insights:\n3. Discussion Results:";

/// Output language, which selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Chinese,
    Japanese,
    Korean,
    /// English, tuned for single Quora answers.
    Quora,
    English,
}

impl Language {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Chinese => CHINESE_PROMPT,
            Self::Japanese => JAPANESE_PROMPT,
            Self::Korean => KOREAN_PROMPT,
            Self::Quora => QUORA_PROMPT,
            Self::English => ENGLISH_PROMPT,
        }
    }

    /// English answers on Quora use the answer-specific template.
    pub fn for_platform(self, platform: Platform) -> Self {
        match (self, platform) {
            (Self::English, Platform::Quora) => Self::Quora,
            (language, _) => language,
        }
    }
}

/// Unrecognized names fall back to English.
impl From<&str> for Language {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "chinese" => Self::Chinese,
            "japanese" => Self::Japanese,
            "korean" => Self::Korean,
            "quora" => Self::Quora,
            _ => Self::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chinese => "chinese",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Quora => "quora",
            Self::English => "english",
        };
        f.write_str(name)
    }
}

/// Length budget of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
    /// Any value the settings did not recognize.
    Unrecognized,
}

impl SummaryLength {
    /// Generation token ceiling sent as `max_tokens`.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Short => 256,
            Self::Medium => 512,
            Self::Long => 1024,
            Self::Unrecognized => 300,
        }
    }
}

impl From<&str> for SummaryLength {
    fn from(name: &str) -> Self {
        match name {
            "short" => Self::Short,
            "medium" => Self::Medium,
            "long" => Self::Long,
            _ => Self::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_is_english() {
        assert_eq!(Language::from("klingon"), Language::English);
        assert_eq!(Language::from("klingon").system_prompt(), ENGLISH_PROMPT);
        assert_eq!(Language::from("Japanese"), Language::Japanese);
    }

    #[test]
    fn test_length_table() {
        assert_eq!(SummaryLength::from("short").max_tokens(), 256);
        assert_eq!(SummaryLength::from("medium").max_tokens(), 512);
        assert_eq!(SummaryLength::from("long").max_tokens(), 1024);
        assert_eq!(SummaryLength::from("LONG").max_tokens(), 300);
        assert_eq!(SummaryLength::from("").max_tokens(), 300);
    }

    #[test]
    fn test_quora_answers_get_answer_template() {
        assert_eq!(
            Language::English.for_platform(Platform::Quora),
            Language::Quora
        );
        assert_eq!(
            Language::Chinese.for_platform(Platform::Quora),
            Language::Chinese
        );
        assert_eq!(
            Language::English.for_platform(Platform::Reddit),
            Language::English
        );
    }
}
