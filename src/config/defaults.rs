//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::geo;

/// Default geocoding backend
pub const DEFAULT_GEOCODER: &str = "opencage";

/// Fallback map center when geolocation is unavailable
pub const DEFAULT_LAT: f64 = geo::DEFAULT_LAT;
pub const DEFAULT_LNG: f64 = geo::DEFAULT_LNG;

/// Default map zoom level
pub const DEFAULT_ZOOM: u8 = geo::DEFAULT_ZOOM;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default environment position source
pub const DEFAULT_LOCATION_SOURCE: &str = "ip";

/// Default interval between position readings while watching, in seconds
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 30;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "trailmark";
