//! Summarization requests to a chat-completions style endpoint.

mod client;
mod prompts;

pub use client::{
    extract_summary, ChatMessage, ChatRequest, HttpTransport, SummaryClient, Transport,
    TransportResponse,
};
pub use prompts::{Language, SummaryLength};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizationError {
    /// Endpoint or credential missing. Raised before any network call.
    #[error("{0}")]
    Configuration(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A success response matched none of the known shapes.
    #[error("Unrecognized response: {0}")]
    Parse(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that turns prompt text into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        content: &str,
        language: Language,
        length: SummaryLength,
    ) -> Result<String, SummarizationError>;
}
