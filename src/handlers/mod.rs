//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod tokens;

use crate::config::Settings;
use crate::middleware::request_logging_middleware;
use crate::services::ChatClient;
use anyhow::{Context, Result};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub chat_client: ChatClient,
}

/// Create application router backed by the OpenAI provider
pub fn create_router(settings: Settings) -> Result<Router> {
    let chat_client = ChatClient::from_settings(&settings)?;
    create_router_with_client(settings, chat_client)
}

/// Create application router around an existing chat client
pub fn create_router_with_client(settings: Settings, chat_client: ChatClient) -> Result<Router> {
    let cors = cors_layer(&settings)?;

    let app_state = Arc::new(AppState {
        settings,
        chat_client,
    });

    let router = Router::new()
        .route("/", get(tokens::tokens_string))
        .route("/tokens", get(tokens::tokens_full))
        .route("/tokens-custom", get(tokens::tokens_custom))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware)),
        );

    Ok(match cors {
        Some(cors) => router.layer(cors),
        None => router,
    })
}

fn cors_layer(settings: &Settings) -> Result<Option<CorsLayer>> {
    if !settings.security.cors_enabled {
        return Ok(None);
    }

    let origin = if settings.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins = settings
            .security
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}
