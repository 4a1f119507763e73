//! Token usage logging
//!
//! Wraps a handler's chat call: logs entry, token usage or error, and exit
//! with elapsed time. The wrapped result is returned untouched.

use crate::models::openai::OpenAIResponse;
use crate::models::{CustomResponse, TokenUsage};
use crate::utils::error::AppResult;
use axum::Json;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info};

/// Results that can report the token usage of the call that produced them
pub trait UsageReport {
    fn token_usage(&self) -> Option<TokenUsage>;
}

impl UsageReport for String {
    fn token_usage(&self) -> Option<TokenUsage> {
        None
    }
}

impl UsageReport for OpenAIResponse {
    fn token_usage(&self) -> Option<TokenUsage> {
        self.usage.as_ref().map(TokenUsage::from)
    }
}

impl UsageReport for CustomResponse {
    fn token_usage(&self) -> Option<TokenUsage> {
        Some(self.usage)
    }
}

impl<T: UsageReport> UsageReport for Json<T> {
    fn token_usage(&self) -> Option<TokenUsage> {
        self.0.token_usage()
    }
}

/// Logs the exit line when dropped, so it is written on every path
/// including cancellation of the wrapped future.
struct ExitLog<'a> {
    method: &'a str,
    started: Instant,
}

impl Drop for ExitLog<'_> {
    fn drop(&mut self) {
        info!(
            "Exiting method: {} (execution time: {}ms)",
            self.method,
            self.started.elapsed().as_millis()
        );
    }
}

/// Run `call` under token usage logging for `method`
pub async fn log_token_usage<T, F>(method: &str, call: F) -> AppResult<T>
where
    T: UsageReport,
    F: Future<Output = AppResult<T>>,
{
    info!("Entering method: {}", method);
    let _exit = ExitLog {
        method,
        started: Instant::now(),
    };

    let result = call.await;

    match &result {
        Ok(value) => {
            if let Some(usage) = value.token_usage() {
                info!("Token usage for {}: {}", method, usage);
            }
        }
        Err(e) => error!("Error in {}: {}", method, e),
    }

    result
}
