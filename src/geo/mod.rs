//! External location services
//!
//! Provides geocoding (place name to coordinates), driving directions and
//! environment geolocation (where the user currently is).

pub mod directions;
pub mod ip_location;
pub mod nominatim;
pub mod opencage;
pub mod position;

#[cfg(test)]
pub(crate) mod test_server;

use crate::config::Config;
use crate::constants::api::USER_AGENT;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// A geocoded location result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the first ranked match for the query, or None if there were
    /// no results. Transport and parse failures are returned as errors.
    fn geocode(&self, query: &str) -> impl Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Resolve a free-text query to a location
///
/// Every failure mode (blank query, network error, bad status, malformed
/// body, out-of-range coordinates, zero results) collapses to `None`. The
/// cause is logged; callers only report "not found" to the user.
pub async fn resolve<G: GeoBackend>(geocoder: &G, query: &str) -> Option<GeoLocation> {
    let query = query.trim();
    if query.is_empty() {
        debug!("Skipping geocode for blank query");
        return None;
    }

    match geocoder.geocode(query).await {
        Ok(Some(location)) => match location.coords().validate() {
            Ok(()) => Some(location),
            Err(e) => {
                warn!("Geocoder returned unusable result for '{}': {}", query, e);
                None
            }
        },
        Ok(None) => {
            debug!("No geocoding results for '{}'", query);
            None
        }
        Err(e) => {
            warn!("Geocoding '{}' failed: {}", query, e);
            None
        }
    }
}

/// Geocoding backend selected by configuration
#[derive(Debug, Clone)]
pub enum Geocoder {
    OpenCage(opencage::OpenCageBackend),
    Nominatim(nominatim::NominatimBackend),
}

impl Geocoder {
    /// Backend name as used in config
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenCage(_) => "opencage",
            Self::Nominatim(_) => "nominatim",
        }
    }
}

impl GeoBackend for Geocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        match self {
            Self::OpenCage(backend) => backend.geocode(query).await,
            Self::Nominatim(backend) => backend.geocode(query).await,
        }
    }
}

/// Build the HTTP client shared by all external service backends
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::Http)
}

/// Get the geocoding backend named in the config
pub fn get_geocoder(config: &Config) -> Result<Geocoder> {
    match config.defaults.geocoder.as_str() {
        "opencage" => opencage_geocoder(config.opencage_key()),
        "nominatim" => Ok(Geocoder::Nominatim(nominatim::NominatimBackend::new()?)),
        other => Err(Error::Config(format!("Unknown geocoder: {}", other))),
    }
}

fn opencage_geocoder(key: Option<String>) -> Result<Geocoder> {
    let key = key.ok_or_else(|| {
        Error::Config(format!(
            "OpenCage geocoder selected but no API key configured (set api_keys.opencage or {})",
            crate::constants::env::OPENCAGE_KEY
        ))
    })?;
    Ok(Geocoder::OpenCage(opencage::OpenCageBackend::new(key)?))
}

/// Get the directions backend, disabled when no API key is configured
pub fn get_directions(config: &Config) -> Result<directions::Directions> {
    match config.openrouteservice_key() {
        Some(key) => Ok(directions::Directions::OpenRouteService(
            directions::OpenRouteServiceBackend::new(key)?,
        )),
        None => {
            debug!("No OpenRouteService key configured, directions disabled");
            Ok(directions::Directions::Disabled)
        }
    }
}

/// Get the environment position source named in the config
pub fn get_locator(config: &Config) -> Result<position::Locator> {
    match config.location.source.as_str() {
        "ip" => Ok(position::Locator::Ip(ip_location::IpLocator::new()?)),
        "fixed" => Ok(position::Locator::Fixed(position::FixedPosition::new(
            config.default_center(),
        ))),
        "off" => Ok(position::Locator::Off),
        other => Err(Error::Config(format!("Unknown location source: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticGeocoder {
        places: HashMap<&'static str, GeoLocation>,
        fail: bool,
    }

    impl GeoBackend for StaticGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
            if self.fail {
                return Err(Error::Geocoding("connection refused".to_string()));
            }
            Ok(self.places.get(query).cloned())
        }
    }

    fn geocoder(fail: bool) -> StaticGeocoder {
        let mut places = HashMap::new();
        places.insert(
            "Paris",
            GeoLocation {
                lat: 48.8566,
                lng: 2.3522,
                display_name: "Paris, France".to_string(),
            },
        );
        places.insert(
            "Nowhere",
            GeoLocation {
                lat: 123.0,
                lng: 0.0,
                display_name: "Broken".to_string(),
            },
        );
        StaticGeocoder { places, fail }
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let location = resolve(&geocoder(false), "Paris").await.unwrap();
        assert_eq!(location.coords(), Coordinates::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn test_resolve_trims_query() {
        assert!(resolve(&geocoder(false), "  Paris ").await.is_some());
    }

    #[tokio::test]
    async fn test_resolve_collapses_failures() {
        assert!(resolve(&geocoder(false), "Atlantis").await.is_none());
        assert!(resolve(&geocoder(false), "").await.is_none());
        assert!(resolve(&geocoder(false), "   ").await.is_none());
        assert!(resolve(&geocoder(false), "Nowhere").await.is_none());
        assert!(resolve(&geocoder(true), "Paris").await.is_none());
    }

    #[test]
    fn test_geo_location_serialization() {
        let loc = GeoLocation {
            lat: 40.7128,
            lng: -74.0060,
            display_name: "New York City".to_string(),
        };

        let json = serde_json::to_string(&loc).unwrap();
        let parsed: GeoLocation = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, loc);
    }

    #[test]
    fn test_opencage_requires_key() {
        // Nothing ever sets this variable, so only the configured value counts
        const UNSET: &str = "TRAILMARK_TEST_NEVER_SET_OPENCAGE_KEY";

        let err = opencage_geocoder(crate::config::key_from(UNSET, "  ")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(crate::constants::env::OPENCAGE_KEY));

        let geocoder = opencage_geocoder(crate::config::key_from(UNSET, "test-key")).unwrap();
        assert_eq!(geocoder.name(), "opencage");
    }

    #[test]
    fn test_get_geocoder_opencage_with_configured_key() {
        let mut config = Config::default();
        config.defaults.geocoder = "opencage".to_string();
        config.api_keys.opencage = "test-key".to_string();
        assert_eq!(get_geocoder(&config).unwrap().name(), "opencage");
    }

    #[test]
    fn test_get_geocoder_by_name() {
        let mut config = Config::default();
        config.defaults.geocoder = "nominatim".to_string();
        assert_eq!(get_geocoder(&config).unwrap().name(), "nominatim");

        config.defaults.geocoder = "bogus".to_string();
        assert!(get_geocoder(&config).is_err());
    }

    #[test]
    fn test_get_locator_by_name() {
        let mut config = Config::default();
        config.location.source = "fixed".to_string();
        assert!(matches!(get_locator(&config).unwrap(), position::Locator::Fixed(_)));

        config.location.source = "off".to_string();
        assert!(matches!(get_locator(&config).unwrap(), position::Locator::Off));

        config.location.source = "gps".to_string();
        assert!(get_locator(&config).is_err());
    }
}
