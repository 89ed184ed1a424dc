use thiserror::Error;

use crate::summarizer::SummarizationError;

#[derive(Error, Debug)]
pub enum ThreadlineError {
    #[error("No adapter available for {0}")]
    UnsupportedSite(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Unrecognized response: {0}")]
    Parse(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ThreadlineError {
    /// Text shown to the user when a triggered action fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedSite(_) => "Summaries are not available on this site".to_string(),
            Self::Extraction(_) => "Could not extract page content".to_string(),
            Self::Configuration(msg) => {
                format!("{msg}. Please configure the AI service in your settings")
            }
            Self::Upstream(msg) => msg.clone(),
            Self::UnknownAction(_) => "Unknown action".to_string(),
            _ => "Failed to generate summary".to_string(),
        }
    }
}

impl From<SummarizationError> for ThreadlineError {
    fn from(err: SummarizationError) -> Self {
        match err {
            SummarizationError::Configuration(msg) => Self::Configuration(msg),
            SummarizationError::Upstream { message, .. } => Self::Upstream(message),
            SummarizationError::Parse(msg) => Self::Parse(msg),
            SummarizationError::Transport(e) => Self::Http(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ThreadlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_points_at_settings() {
        let err = ThreadlineError::Configuration("AI service endpoint not configured".into());
        let msg = err.user_message();
        assert!(msg.starts_with("AI service endpoint not configured"));
        assert!(msg.contains("settings"));
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = ThreadlineError::from(SummarizationError::Upstream {
            status: 429,
            message: "Rate limit reached".into(),
        });
        assert!(matches!(err, ThreadlineError::Upstream(_)));
        assert_eq!(err.user_message(), "Rate limit reached");
    }

    #[test]
    fn test_parse_error_is_generic_for_users() {
        let err = ThreadlineError::from(SummarizationError::Parse("{}".into()));
        assert_eq!(err.user_message(), "Failed to generate summary");
    }
}
