mod routes;
mod state;

use anyhow::{Context, Result};
use ecoeventos_core::{EcoConfig, EventStore};
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EcoConfig::load()?;
    let storage = config.storage();
    tracing::info!("Using event store at {}", storage.path().display());

    let state = AppState::new(EventStore::new(storage));
    let app = routes::app(state);

    let ip: IpAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind_address '{}'", config.bind_address))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!("ecoeventos-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
