//! signal-hub server entry point.
//!
//! Starts the Axum server with the `/ws` signaling endpoint and `/health`.

use tracing_subscriber::EnvFilter;

use signal_hub::app_state::AppState;
use signal_hub::config::{LogFormat, RelayConfig};
use signal_hub::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        origins = ?config.allowed_origins.origins(),
        "starting signal-hub"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    let state = AppState::new(config);

    server::serve(listener, state, server::shutdown_signal()).await?;

    tracing::info!("signal-hub stopped");
    Ok(())
}
