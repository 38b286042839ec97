use anyhow::{Context, Result};
use tracing::info;

use esai_feedback_api::{app, config, middleware, services};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to initialize metrics")?;

    info!("Starting ESAI feedback API v{}", env!("CARGO_PKG_VERSION"));

    let anonymizer = services::build_anonymizer(&config.pii)?;
    let store = services::build_feedback_store(&config).await?;

    let addr = config.socket_addr()?;
    let app = app::create_app(config, anonymizer, store);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
