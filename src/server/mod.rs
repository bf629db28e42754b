//! HTTP server for trailmark
//!
//! Lets a browser map widget drive a tracking session: it pushes location
//! updates and user actions, and reads back the state to draw.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{get_directions, get_geocoder, get_locator};
use crate::tracker::session::Session;
use crate::tracker::ViewState;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Once the server has shut down after Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let geocoder = get_geocoder(&config)?;
    let geocoder_name = geocoder.name();
    let session = Session::spawn(
        ViewState::new(config.default_center()),
        geocoder,
        get_directions(&config)?,
        get_locator(&config)?,
    );

    let state = Arc::new(AppState::new(config, session.clone(), geocoder_name));
    let app = create_router(state);

    info!("Starting server on {} (geocoder: {})", addr, geocoder_name);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    session.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
