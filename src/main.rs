use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_toolbox_backend::{build_app, server::shutdown_signal, AppState, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ai_toolbox_backend=debug,tower_http=debug")),
        )
        .init();

    let settings = Settings::load().context("failed to load configuration")?;

    if settings.provider.contract_api_key.is_empty() {
        warn!("No contract API key configured; the provider will reject contract reviews");
    }
    if settings.provider.translation_api_key.is_empty() {
        warn!("No translation API key configured; the provider will reject translations");
    }
    info!(
        "Provider: {}, allowed origins: {:?}",
        settings.provider.base_url, settings.server.allowed_origins
    );

    let addr = settings.bind_address();
    let app = build_app(AppState::new(settings));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
