//! Provider module
//!
//! Defines the Provider trait and the OpenAI-compatible implementation

pub mod openai;

use crate::models::openai::{OpenAIRequest, OpenAIResponse};
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// Provider trait for upstream chat completion APIs
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send a chat completion request (non-streaming)
    async fn chat_complete(&self, request: OpenAIRequest) -> AppResult<OpenAIResponse>;
}

pub use openai::OpenAIProvider;
