//! Token usage handlers
//!
//! Each endpoint sends the configured prompt upstream and returns the reply
//! in a different shape.

use crate::handlers::AppState;
use crate::middleware::log_token_usage;
use crate::models::openai::OpenAIResponse;
use crate::models::CustomResponse;
use crate::utils::error::AppResult;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Generated text as plain text
///
/// GET /
pub async fn tokens_string(State(state): State<Arc<AppState>>) -> AppResult<String> {
    log_token_usage("tokens_string", async {
        state.chat_client.content(&state.settings.chat.prompt).await
    })
    .await
}

/// Full upstream chat completion object
///
/// GET /tokens
pub async fn tokens_full(State(state): State<Arc<AppState>>) -> AppResult<Json<OpenAIResponse>> {
    log_token_usage("tokens_full", async {
        state.chat_client.call(&state.settings.chat.prompt).await.map(Json)
    })
    .await
}

/// Generated text with token usage
///
/// GET /tokens-custom
pub async fn tokens_custom(State(state): State<Arc<AppState>>) -> AppResult<Json<CustomResponse>> {
    log_token_usage("tokens_custom", async {
        state.chat_client.custom(&state.settings.chat.prompt).await.map(Json)
    })
    .await
}
