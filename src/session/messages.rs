//! Requests and responses exchanged with the surrounding shell.
//!
//! A request is either a bare action string (`"summarize"`) or an object
//! with an `action` field. Every response carries `success`, plus `data` on
//! success or `error` on failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::{Result, ThreadlineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Summarize,
    ToggleSidebar,
    GetPageInfo,
}

impl Action {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "summarize" => Ok(Self::Summarize),
            "toggleSidebar" => Ok(Self::ToggleSidebar),
            "getPageInfo" => Ok(Self::GetPageInfo),
            other => Err(ThreadlineError::UnknownAction(other.to_string())),
        }
    }
}

/// Reads the action out of a raw JSON request.
pub fn parse_request(raw: &str) -> Result<Action> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|_| ThreadlineError::UnknownAction(raw.trim().to_string()))?;

    let name = match &value {
        Value::String(name) => name.as_str(),
        Value::Object(map) => map.get("action").and_then(Value::as_str).unwrap_or(""),
        _ => "",
    };
    Action::from_name(name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn with_data<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                data: Some(value),
                error: None,
            },
            Err(e) => Self::failure(&ThreadlineError::Json(e)),
        }
    }

    pub fn failure(err: &ThreadlineError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.user_message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Discussion,
    Listing,
}

/// What the popup shows about the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(rename = "type")]
    pub kind: PageKind,
    pub platform: String,
    pub is_discussion: bool,
    pub title: String,
    pub url: String,
    pub can_summarize: bool,
}
