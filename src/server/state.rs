//! Server shared state
//!
//! Holds configuration and the handle of the session every request talks to.

use crate::config::Config;
use crate::tracker::session::SessionHandle;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// The tracking session
    pub session: SessionHandle,

    /// Name of the geocoding backend in use
    pub geocoder: String,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, session: SessionHandle, geocoder: impl Into<String>) -> Self {
        Self {
            config,
            session,
            geocoder: geocoder.into(),
        }
    }

    /// Zoom level frames are projected at
    pub fn zoom(&self) -> u8 {
        self.config.defaults.zoom
    }
}
