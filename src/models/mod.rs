//! Data models module
//!
//! Upstream chat completion structures plus the response shapes served by this service

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod openai;

use openai::{OpenAIResponse, OpenAIUsage};

/// Token usage reported by the upstream service for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt token count
    pub prompt_tokens: u32,
    /// Completion token count
    pub completion_tokens: u32,
    /// Total token count
    pub total_tokens: u32,
}

impl From<&OpenAIUsage> for TokenUsage {
    fn from(usage: &OpenAIUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "promptTokens={}, completionTokens={}, totalTokens={}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

/// Generated text paired with its token usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomResponse {
    /// Generated text
    pub content: String,
    /// Token usage
    pub usage: TokenUsage,
}

impl OpenAIResponse {
    /// Usage in the service's own shape, zeros when upstream reported none
    pub fn usage_summary(&self) -> TokenUsage {
        self.usage.as_ref().map(TokenUsage::from).unwrap_or_default()
    }
}
