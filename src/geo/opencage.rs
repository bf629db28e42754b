//! OpenCage geocoding backend
//!
//! Requires an API key, supplied through config or the
//! `TRAILMARK_OPENCAGE_KEY` environment variable.

use crate::constants::api::OPENCAGE_URL;
use crate::error::{Error, Result};
use crate::geo::{http_client, GeoBackend, GeoLocation};
use serde::Deserialize;

/// OpenCage geocoding backend
#[derive(Clone)]
pub struct OpenCageBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// OpenCage forward geocoding response
#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
    #[serde(default)]
    formatted: String,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

impl OpenCageBackend {
    /// Create a new OpenCage backend
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(OPENCAGE_URL, api_key)
    }

    /// Create a backend against a different API host
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/geocode/v1/json?q={}&key={}&limit=1&no_annotations=1",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        )
    }

    fn first_result(response: OpenCageResponse) -> Option<GeoLocation> {
        response.results.into_iter().next().map(|result| GeoLocation {
            lat: result.geometry.lat,
            lng: result.geometry.lng,
            display_name: result.formatted,
        })
    }
}

impl std::fmt::Debug for OpenCageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCageBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl GeoBackend for OpenCageBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("OpenCage request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "OpenCage returned status: {}",
                response.status()
            )));
        }

        let body: OpenCageResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse OpenCage response: {}", e)))?;

        Ok(Self::first_result(body))
    }
}
