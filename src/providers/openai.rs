//! OpenAI Provider implementation
//!
//! Standard OpenAI-compatible API provider

use super::Provider;
use crate::config::Settings;
use crate::models::openai::*;
use crate::utils::error::{AppError, AppResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error};

/// OpenAI Provider
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    url: String,
    api_key: String,
}

impl OpenAIProvider {
    /// Create a provider from the application settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.openai.timeout))
            .user_agent(concat!("tokenmeter/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: settings.chat_url(),
            api_key: settings.openai.api_key.clone(),
        })
    }

    /// Chat completions endpoint this provider posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Handle HTTP response
    async fn handle_response(&self, response: Response) -> AppResult<OpenAIResponse> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse OpenAI response: {}", e);
                AppError::InvalidResponse(format!("unparseable completion body: {}", e))
            })?;
            debug!("OpenAI request completed successfully");
            return Ok(openai_response);
        }

        // Try to parse as OpenAI error format
        let message = match serde_json::from_str::<OpenAIErrorResponse>(&body) {
            Ok(error_response) => error_response.error.message,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            Err(_) => body,
        };

        error!("OpenAI API request failed: {} - {}", status, message);
        Err(AppError::ExternalApi {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat_complete(&self, request: OpenAIRequest) -> AppResult<OpenAIResponse> {
        debug!("Sending OpenAI chat completion request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
