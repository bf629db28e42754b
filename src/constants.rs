//! Centralized constants for the trailmark crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Earth radius in meters used for great-circle distance (WGS84 equatorial)
    pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

    /// Default map center when geolocation is unavailable (central London)
    pub const DEFAULT_LAT: f64 = 51.505;
    pub const DEFAULT_LNG: f64 = -0.09;

    /// Default map zoom level
    pub const DEFAULT_ZOOM: u8 = 13;
}

/// External API endpoints
pub mod api {
    /// OpenCage geocoding API
    pub const OPENCAGE_URL: &str = "https://api.opencagedata.com";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// OpenRouteService directions API
    pub const OPENROUTESERVICE_URL: &str = "https://api.openrouteservice.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// User agent sent to every external service
    pub const USER_AGENT: &str = concat!("trailmark/", env!("CARGO_PKG_VERSION"));
}

/// Environment variables that override configured API keys
pub mod env {
    pub const OPENCAGE_KEY: &str = "TRAILMARK_OPENCAGE_KEY";
    pub const OPENROUTESERVICE_KEY: &str = "TRAILMARK_OPENROUTESERVICE_KEY";
}
