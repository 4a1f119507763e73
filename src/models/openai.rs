//! OpenAI API data models
//!
//! Defines OpenAI chat completion request and response structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OpenAI API request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    /// Model name
    pub model: String,
    /// Message list
    pub messages: Vec<OpenAIMessage>,
    /// Maximum tokens to generate (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Whether to stream response (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// OpenAI message structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role (system/user/assistant)
    pub role: String,
    /// Message content
    pub content: Option<String>,
    /// Fields this crate does not model (tool calls, refusals, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// OpenAI API response structure
///
/// Unknown upstream fields are preserved so the object can be re-emitted as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIResponse {
    /// Response ID
    pub id: String,
    /// Object type
    pub object: String,
    /// Creation timestamp
    pub created: u64,
    /// Model used
    pub model: String,
    /// Choice list
    pub choices: Vec<OpenAIChoice>,
    /// Usage statistics (some compatible servers omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAIUsage>,
    /// Remaining upstream fields (system_fingerprint, service_tier, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// OpenAI choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIChoice {
    /// Choice index
    pub index: u32,
    /// Message content
    pub message: OpenAIMessage,
    /// Finish reason
    pub finish_reason: Option<String>,
    /// Remaining upstream fields (logprobs, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// OpenAI usage statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIUsage {
    /// Prompt token count
    pub prompt_tokens: u32,
    /// Completion token count
    pub completion_tokens: u32,
    /// Total token count
    pub total_tokens: u32,
    /// Token breakdowns (prompt_tokens_details, completion_tokens_details, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// OpenAI error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIErrorResponse {
    /// Error information
    pub error: OpenAIError,
}

/// OpenAI error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIError {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
}

impl OpenAIMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            extra: HashMap::new(),
        }
    }
}

impl OpenAIResponse {
    /// Text of the first choice
    ///
    /// `None` when upstream returned no choices; an empty string when the
    /// first choice carried no content.
    pub fn content(&self) -> Option<String> {
        self.choices
            .first()
            .map(|choice| choice.message.content.clone().unwrap_or_default())
    }
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            messages: Vec::new(),
            max_tokens: None,
            temperature: None,
            stream: None,
        }
    }
}
