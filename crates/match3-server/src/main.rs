//! Match-3 game host.
//!
//! Serves one game session per WebSocket client. The host owns the pause
//! between a committed swap and its cascade, standing in for the client's
//! swap animation.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod server;
mod session;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    info!(
        dimension = config.engine.dimension,
        colors = config.engine.color_count,
        resolve_delay_ms = config.resolve_delay.as_millis() as u64,
        session_idle_ttl_secs = config.session_idle_ttl.as_secs(),
        "Starting match-3 server..."
    );

    let state = Arc::new(ServerState::new(config));

    server::run_server(state).await
}
