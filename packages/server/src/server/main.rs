// Main entry point for API server

use anyhow::{Context, Result};
use scrape_server::{
    server::{build_app, AppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scrape_server=debug,scrape_job=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Universal E-commerce Scraper API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        python_cmd = %config.python_cmd.display(),
        scraper_script = %config.scraper_script.display(),
        timeout_ms = config.scraper_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    // Build application
    let app = build_app(AppState::new(config.job_config()));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("API Gateway listening on http://localhost:{}", config.port);
    tracing::info!("Health check: http://localhost:{}/api/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received shutdown signal");
}
