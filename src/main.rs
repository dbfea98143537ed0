use anyhow::Result;
use miniapp_auth::{build_router, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let endpoint = config.server.bind_addr.clone();

    // Installs the tracing subscriber as well
    let app = build_router(config)?;

    info!("Starting at endpoint:{}", endpoint);
    info!("Starting mini app auth server v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
