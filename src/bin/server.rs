//! adaptive-agent-core HTTP server binary.
//!
//! Starts an axum HTTP server over a single shared agent session and drives
//! its virtual clock from wall time.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `AGENT_CORE_CONFIG`: YAML config file (default: `./agent-core.yml` if present)
//! - `AGENT_CORE_STORE`: Storage backend: "memory" (default), "file" or "sqlite"
//! - `AGENT_CORE_DATA_DIR`: Data directory or SQLite file
//! - `RUST_LOG`: Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! AGENT_CORE_STORE=sqlite cargo run --bin agent-core-server
//! ```

use std::sync::Arc;
use std::time::Duration;

use adaptive_agent_core::core::{shared, spawn_clock};
use adaptive_agent_core::interfaces::{open_store, LogNotifier, WriteBehindStore};
use adaptive_agent_core::server::{app_router, AppState};
use adaptive_agent_core::utilities::config::StorageBackend;
use adaptive_agent_core::{AgentCore, CoreConfig};
use tokio::sync::broadcast::error::RecvError;

const CLOCK_TICK: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,adaptive_agent_core=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let config = CoreConfig::load(None)?;
    tracing::info!("Storage backend: {:?} at {}", config.storage.backend, config.storage.path.display());
    let mut store = open_store(&config.storage)?;
    if config.storage.backend != StorageBackend::Memory {
        store = Arc::new(WriteBehindStore::spawn(store));
    }
    let core = shared(AgentCore::open(config, store, Arc::new(LogNotifier)));

    let mut events = core.lock().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => tracing::debug!(
                    seq = envelope.emission_sequence,
                    event = envelope.event.event_type(),
                    "core event"
                ),
                Err(RecvError::Lagged(skipped)) => tracing::warn!("Event logger lagged, skipped {}", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let clock = spawn_clock(core.clone(), CLOCK_TICK);
    let app = app_router(AppState::new(core));

    tracing::info!("adaptive-agent-core server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health: liveness probe");
    tracing::info!("  GET  /state: session snapshot");
    tracing::info!("  POST /input: universal input");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let served = axum::serve(listener, app).await;
    clock.abort();
    served?;
    Ok(())
}
