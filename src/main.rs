//! metacat - Business metadata service for warehouse data catalogs.

use std::sync::Arc;

use metacat::api::{self, AppState};
use metacat::cli::Cli;
use metacat::config::Settings;
use metacat::error::{MetacatError, Result};
use metacat::warehouse::{StatementClient, WarehouseConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Seed the environment from a dotenv file before reading settings
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                MetacatError::config(format!("Failed to load {}: {}", path.display(), e))
            })?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let mut settings = Settings::from_env()?;
    cli.apply_overrides(&mut settings);
    info!("Warehouse: {}", settings.display_string());

    let client = StatementClient::new(WarehouseConfig::from_settings(&settings))?;
    let state = AppState::new(Arc::new(client));
    let app = api::router(state);

    let addr = format!("{}:{}", settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MetacatError::config(format!("Failed to bind {}: {}", addr, e)))?;
    info!("metacat listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MetacatError::internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
