//! Token Meter Server
//!
//! Serves a fun fact from a chat completion API in three shapes and logs token usage

use anyhow::{Context, Result};
use tokenmeter::handlers::{create_router, health};
use tokenmeter::utils::logging::init_logging;
use tokenmeter::{version_info, Settings};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    health::mark_started();

    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings.logging)?;
    info!("{}", version_info());
    info!(
        "Using model {} at {}",
        settings.chat.model,
        settings.openai.base_url
    );

    let app = create_router(settings.clone())?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Token meter server started!");
    info!("📝 Fun fact: http://{}/", addr);
    info!("🔢 Full response: http://{}/tokens", addr);
    info!("📊 Custom response: http://{}/tokens-custom", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
