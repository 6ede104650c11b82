mod form;
mod routes;
mod singleton;
mod state;
mod views;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use schoolcal_core::config::{ServerConfig, StorageTarget};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

/// Initialize tracing with the SCHOOLCAL_LOG environment variable.
///
/// Defaults to "info" level if SCHOOLCAL_LOG is not set.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SCHOOLCAL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    let target = config.storage_target()?;

    // Only one server may write a given JSON document
    let _lock = match &target {
        StorageTarget::Json { path } => Some(singleton::acquire_lock(path)?),
        StorageTarget::Sqlite { .. } => None,
    };

    let store = schoolcal_core::store::open(&target)
        .await
        .context("Failed to open event store")?;
    let state = AppState::new(store);

    let app = routes::app(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("schoolcal-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
