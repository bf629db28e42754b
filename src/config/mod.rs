//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/trailmark/config.toml
//!
//! API keys may also come from the environment, which takes precedence over
//! the file.

pub mod defaults;

use crate::constants::env;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default values for sessions and output
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Environment geolocation settings
    #[serde(default)]
    pub location: LocationConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Default values for sessions and output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Geocoding backend (opencage or nominatim)
    #[serde(default = "default_geocoder")]
    pub geocoder: String,

    /// Fallback center latitude
    #[serde(default = "default_lat")]
    pub lat: f64,

    /// Fallback center longitude
    #[serde(default = "default_lng")]
    pub lng: f64,

    /// Map zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Environment geolocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Position source: ip, fixed (the fallback center) or off
    #[serde(default = "default_location_source")]
    pub source: String,

    /// Seconds between readings while watching
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// OpenCage geocoding API key
    #[serde(default)]
    pub opencage: String,

    /// OpenRouteService directions API key
    #[serde(default)]
    pub openrouteservice: String,
}

// Default value functions for serde
fn default_geocoder() -> String {
    DEFAULT_GEOCODER.to_string()
}
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lng() -> f64 {
    DEFAULT_LNG
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_location_source() -> String {
    DEFAULT_LOCATION_SOURCE.to_string()
}
fn default_watch_interval() -> u64 {
    DEFAULT_WATCH_INTERVAL_SECS
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},{zoom}z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map={zoom}/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}&z={zoom}".to_string(),
    );
    providers
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            geocoder: default_geocoder(),
            lat: default_lat(),
            lng: default_lng(),
            zoom: default_zoom(),
            format: default_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            source: default_location_source(),
            watch_interval_secs: default_watch_interval(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

/// Environment value wins over the configured one; blank means unset
pub(crate) fn key_from(env_var: &str, configured: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| Some(configured.to_string()).filter(|v| !v.trim().is_empty()))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let config: Config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            config
        };

        config.default_center().validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// OpenCage key from the environment or config file
    pub fn opencage_key(&self) -> Option<String> {
        key_from(env::OPENCAGE_KEY, &self.api_keys.opencage)
    }

    /// OpenRouteService key from the environment or config file
    pub fn openrouteservice_key(&self) -> Option<String> {
        key_from(env::OPENROUTESERVICE_KEY, &self.api_keys.openrouteservice)
    }

    /// Map center used before any position is known
    pub fn default_center(&self) -> Coordinates {
        Coordinates::new(self.defaults.lat, self.defaults.lng)
    }

    /// Interval between position readings while watching
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.location.watch_interval_secs.max(1))
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "geocoder"] => Some(self.defaults.geocoder.clone()),
            ["defaults", "lat"] => Some(self.defaults.lat.to_string()),
            ["defaults", "lng"] => Some(self.defaults.lng.to_string()),
            ["defaults", "zoom"] => Some(self.defaults.zoom.to_string()),
            ["defaults", "format"] => Some(self.defaults.format.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["location", "source"] => Some(self.location.source.clone()),
            ["location", "watch_interval_secs"] => {
                Some(self.location.watch_interval_secs.to_string())
            }

            ["url", "default"] => Some(self.url.default.clone()),

            ["api_keys", "opencage"] => Some(self.api_keys.opencage.clone()),
            ["api_keys", "openrouteservice"] => Some(self.api_keys.openrouteservice.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "geocoder"] => match value {
                "opencage" | "nominatim" => self.defaults.geocoder = value.to_string(),
                _ => return Err(Error::Config(format!("Unknown geocoder: {}", value))),
            },
            ["defaults", "lat"] => {
                let lat = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid latitude value: {}", value)))?;
                Coordinates::new(lat, self.defaults.lng).validate()?;
                self.defaults.lat = lat;
            }
            ["defaults", "lng"] => {
                let lng = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid longitude value: {}", value)))?;
                Coordinates::new(self.defaults.lat, lng).validate()?;
                self.defaults.lng = lng;
            }
            ["defaults", "zoom"] => {
                self.defaults.zoom = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid zoom value: {}", value)))?;
            }
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }

            ["location", "source"] => match value {
                "ip" | "fixed" | "off" => self.location.source = value.to_string(),
                _ => return Err(Error::Config(format!("Unknown location source: {}", value))),
            },
            ["location", "watch_interval_secs"] => {
                self.location.watch_interval_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid interval value: {}", value)))?;
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            ["api_keys", "opencage"] => {
                self.api_keys.opencage = value.to_string();
            }
            ["api_keys", "openrouteservice"] => {
                self.api_keys.openrouteservice = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.geocoder",
            "defaults.lat",
            "defaults.lng",
            "defaults.zoom",
            "defaults.format",
            "server.host",
            "server.port",
            "location.source",
            "location.watch_interval_secs",
            "url.default",
            "api_keys.opencage",
            "api_keys.openrouteservice",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat}, {lng} and {zoom} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, center: Coordinates, zoom: u8) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        Ok(template
            .replace("{lat}", &center.lat.to_string())
            .replace("{lng}", &center.lng.to_string())
            .replace("{zoom}", &zoom.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that point XDG_CONFIG_HOME at a temp dir
    static CONFIG_HOME: Mutex<()> = Mutex::new(());

    fn with_temp_config<F: FnOnce()>(f: F) {
        let _guard = CONFIG_HOME.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.defaults.geocoder, "opencage");
        assert_eq!(config.default_center(), Coordinates::new(51.505, -0.09));
        assert_eq!(config.defaults.zoom, 13);
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.location.source, "ip");
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("defaults.geocoder"), Some("opencage".to_string()));

        config.set("defaults.geocoder", "nominatim").unwrap();
        assert_eq!(config.get("defaults.geocoder"), Some("nominatim".to_string()));

        config.set("defaults.lat", "48.8566").unwrap();
        assert_eq!(config.defaults.lat, 48.8566);

        config.set("api_keys.opencage", "abc").unwrap();
        assert_eq!(config.get("api_keys.opencage"), Some("abc".to_string()));
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_number").is_err());
        assert!(config.set("defaults.lat", "91").is_err());
        assert!(config.set("defaults.geocoder", "google").is_err());
        assert!(config.set("location.source", "gps").is_err());
        assert_eq!(config.defaults.lat, 51.505);
    }

    #[test]
    fn test_keys_blank_means_unset() {
        let mut config = Config::default();
        config.api_keys.openrouteservice = "   ".to_string();
        if std::env::var(env::OPENROUTESERVICE_KEY).is_err() {
            assert_eq!(config.openrouteservice_key(), None);
        }

        config.api_keys.openrouteservice = "ors".to_string();
        assert!(config.openrouteservice_key().is_some());
    }

    #[test]
    fn test_key_from_prefers_environment() {
        std::env::set_var("TRAILMARK_TEST_KEY_FROM", "from-env");
        assert_eq!(
            key_from("TRAILMARK_TEST_KEY_FROM", "from-file"),
            Some("from-env".to_string())
        );
        std::env::remove_var("TRAILMARK_TEST_KEY_FROM");
        assert_eq!(
            key_from("TRAILMARK_TEST_KEY_FROM", "from-file"),
            Some("from-file".to_string())
        );
        assert_eq!(key_from("TRAILMARK_TEST_KEY_FROM", ""), None);
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();
        let center = Coordinates::new(40.7128, -74.0060);

        let url = config.format_url(Some("google"), center, 13).unwrap();
        assert_eq!(url, "https://www.google.com/maps/@40.7128,-74.006,13z");

        let url = config.format_url(Some("openstreetmap"), center, 15).unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=15/40.7128/-74.006");
    }

    #[test]
    fn test_format_url_default_provider() {
        let config = Config::default();
        let url = config
            .format_url(None, Coordinates::new(40.7128, -74.0060), 13)
            .unwrap();
        assert!(url.contains("openstreetmap.org"));
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        let result = config.format_url(Some("unknown"), Coordinates::default(), 13);
        assert!(result.is_err());
    }

    #[test]
    fn test_watch_interval_never_zero() {
        let mut config = Config::default();
        config.location.watch_interval_secs = 0;
        assert_eq!(config.watch_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.defaults.geocoder = "nominatim".to_string();
            config.defaults.zoom = 10;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.defaults.geocoder, "nominatim");
            assert_eq!(loaded.defaults.zoom, 10);
        });
    }

    #[test]
    fn test_load_rejects_bad_files() {
        with_temp_config(|| {
            let path = Config::config_path().unwrap();
            fs::create_dir_all(path.parent().unwrap()).unwrap();

            fs::write(&path, "[defaults\nzoom = ").unwrap();
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("Failed to parse config file"));

            fs::write(&path, "[defaults]\nlat = 120.0\n").unwrap();
            assert!(matches!(
                Config::load(),
                Err(Error::InvalidCoordinates(_))
            ));
        });
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[defaults]\nzoom = 5\n").unwrap();
        assert_eq!(config.defaults.zoom, 5);
        assert_eq!(config.defaults.geocoder, "opencage");
        assert_eq!(config.server.port, 7878);
        assert!(config.url.providers.contains_key("apple"));
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[location]"));
        assert!(toml.contains("[url.providers]"));
        assert!(toml.contains("[api_keys]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_available_keys_are_gettable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} not gettable", key);
        }
    }
}
