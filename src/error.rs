//! Error types for trailmark

use thiserror::Error;

/// Main error type for trailmark operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Directions error: {0}")]
    Directions(String),

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("Session closed")]
    SessionClosed,
}

/// Result type alias for trailmark operations
pub type Result<T> = std::result::Result<T, Error>;
