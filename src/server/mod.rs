//! HTTP server for geopick
//!
//! Exposes the geocoding service and hosts address widgets (picker
//! sessions) for web clients.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::nominatim::NominatimClient;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server on the configured address
///
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Useful when the command line overrides the config
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let geocoder = Arc::new(NominatimClient::new(&config.geocoder)?);
    info!(geocoder = geocoder.base_url(), "using geocoding service");

    let state = Arc::new(AppState::new(config, geocoder));
    if state.spawn_reaper().is_some() {
        info!(
            ttl_secs = state.config.server.session_ttl_secs,
            "closing idle picker sessions"
        );
    }
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
