//! Labyrinth Server
//!
//! Authoritative server for hidden-maze duels over WebSocket.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labyrinth::{GatewayServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServerConfig::default();
    if let Ok(bind) = std::env::var("LABYRINTH_BIND") {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid LABYRINTH_BIND address: {bind}"))?;
    }

    info!("Labyrinth Server v{}", VERSION);
    info!("Binding to {}", config.bind_addr);

    let server = GatewayServer::new(config);
    server.run().await.context("gateway terminated")?;

    Ok(())
}
