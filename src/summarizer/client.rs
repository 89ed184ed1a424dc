use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SummarySettings;
use crate::summarizer::{Language, SummarizationError, Summarizer, SummaryLength};

const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_UPSTREAM_MESSAGE: &str = "AI service error";

/// Where the summary text may sit in a success response, tried in order.
const SUMMARY_POINTERS: [&str; 3] = ["/choices/0/message/content", "/response", "/summary"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Status and raw body of an endpoint response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request to the endpoint. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, SummarizationError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, SummarizationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, SummarizationError> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Summarization over a configured endpoint.
pub struct SummaryClient<T = HttpTransport> {
    transport: T,
    endpoint: String,
    api_key: String,
    model: String,
}

impl SummaryClient<HttpTransport> {
    pub fn new(settings: &SummarySettings) -> Result<Self, SummarizationError> {
        Ok(Self::with_transport(HttpTransport::new()?, settings))
    }
}

impl<T: Transport> SummaryClient<T> {
    pub fn with_transport(transport: T, settings: &SummarySettings) -> Self {
        if settings.ai_provider != "custom" {
            warn!(
                "Provider {:?} is not supported, using the configured endpoint",
                settings.ai_provider
            );
        }
        Self {
            transport,
            endpoint: settings.endpoint.trim().to_string(),
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
        }
    }

    pub fn build_request(
        &self,
        content: &str,
        language: Language,
        length: SummaryLength,
    ) -> ChatRequest {
        let model = if self.model.trim().is_empty() {
            "gpt-3.5-turbo".to_string()
        } else {
            self.model.clone()
        };

        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: language.system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: content.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: length.max_tokens(),
        }
    }

    fn check_configured(&self) -> Result<(), SummarizationError> {
        if self.endpoint.is_empty() {
            return Err(SummarizationError::Configuration(
                "AI service endpoint not configured".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(SummarizationError::Configuration(
                "API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// The upstream's `error.message`, or a generic message.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string())
}

/// First non-empty summary among the known response shapes.
pub fn extract_summary(value: &Value) -> Option<String> {
    SUMMARY_POINTERS
        .iter()
        .filter_map(|pointer| value.pointer(pointer))
        .filter_map(Value::as_str)
        .find(|text| !text.is_empty())
        .map(String::from)
}

#[async_trait]
impl<T: Transport> Summarizer for SummaryClient<T> {
    async fn summarize(
        &self,
        content: &str,
        language: Language,
        length: SummaryLength,
    ) -> Result<String, SummarizationError> {
        self.check_configured()?;

        let request = self.build_request(content, language, length);
        debug!(
            "Requesting {} summary ({} max tokens) from {}",
            language, request.max_tokens, self.endpoint
        );

        let response = self
            .transport
            .post(&self.endpoint, &self.api_key, &request)
            .await?;

        if !response.is_success() {
            let message = upstream_message(&response.body);
            warn!("Summarization failed with {}: {}", response.status, message);
            return Err(SummarizationError::Upstream {
                status: response.status,
                message,
            });
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| SummarizationError::Parse(e.to_string()))?;
        extract_summary(&value).ok_or_else(|| {
            SummarizationError::Parse(format!("no summary field in {}", response.body))
        })
    }
}
