//! Chat client service
//!
//! Sends prompts to the configured provider and shapes the replies

use crate::config::Settings;
use crate::models::openai::{OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::models::CustomResponse;
use crate::providers::{OpenAIProvider, Provider};
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::{truncate_content, CONTENT_PREVIEW_LEN};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Options applied to every chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.chat.model.clone(),
            temperature: settings.chat.temperature,
            max_tokens: settings.chat.max_tokens,
        }
    }
}

/// Client that sends a prompt upstream and returns generated text plus usage
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn Provider>,
    options: ChatOptions,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .finish()
    }
}

impl ChatClient {
    pub fn new(provider: Arc<dyn Provider>, options: ChatOptions) -> Self {
        Self { provider, options }
    }

    /// Build a client backed by the OpenAI provider
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = OpenAIProvider::new(settings)?;
        Ok(Self::new(Arc::new(provider), ChatOptions::from_settings(settings)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Build a single-turn request for `prompt`
    pub fn build_request(&self, prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.options.model.clone(),
            messages: vec![OpenAIMessage::user(prompt)],
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            stream: None,
        }
    }

    /// Send `prompt` and return the full upstream response
    pub async fn call(&self, prompt: &str) -> AppResult<OpenAIResponse> {
        let response = self.provider.chat_complete(self.build_request(prompt)).await?;

        debug!(
            "Chat completion {} from model {} ({} choices)",
            response.id,
            response.model,
            response.choices.len()
        );

        Ok(response)
    }

    /// Send `prompt` and return only the generated text
    pub async fn content(&self, prompt: &str) -> AppResult<String> {
        let response = self.call(prompt).await?;
        first_choice_content(&response)
    }

    /// Send `prompt` and return the generated text with its token usage
    pub async fn custom(&self, prompt: &str) -> AppResult<CustomResponse> {
        let response = self.call(prompt).await?;

        Ok(CustomResponse {
            content: first_choice_content(&response)?,
            usage: response.usage_summary(),
        })
    }
}

fn first_choice_content(response: &OpenAIResponse) -> AppResult<String> {
    let content = response.content().ok_or_else(|| {
        AppError::InvalidResponse(format!("completion {} contains no choices", response.id))
    })?;

    debug!("Generated content: {}", truncate_content(&content, CONTENT_PREVIEW_LEN));
    Ok(content)
}
