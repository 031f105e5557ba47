use anyhow::Context;
use sifter_core::AppConfig;
use sifter_server::{app, init_tracing, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Sifter v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    info!(
        transport = ?config.transport.mode,
        base_url = %config.scraping.base_url,
        max_pages = config.scraping.max_pages,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config).context("failed to build scrape pipeline")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
