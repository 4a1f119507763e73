//! Health check handlers
//!
//! Report service status without calling the upstream API

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Upstream provider name
    pub provider: String,
    /// Model requested upstream
    pub model: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the process start; later calls keep the first value
pub fn mark_started() {
    START_TIME.get_or_init(Instant::now);
}

/// Get service uptime in seconds
pub fn uptime_seconds() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

/// Basic health check
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            provider: state.chat_client.provider_name().to_string(),
            model: state.chat_client.options().model.clone(),
            uptime_seconds: uptime_seconds(),
        }),
    })
}

/// Liveness check
///
/// GET /health/live
pub async fn liveness_check() -> Json<HealthResponse> {
    debug!("Executing liveness check");

    Json(HealthResponse {
        status: "alive".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: None,
    })
}
