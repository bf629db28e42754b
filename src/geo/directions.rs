//! Driving directions (OpenRouteService)
//!
//! Best-effort: callers report failures to the user and carry on.

use crate::constants::api::OPENROUTESERVICE_URL;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::http_client;
use serde::Deserialize;
use std::future::Future;

/// Trait for directions backends
pub trait DirectionsBackend: Send + Sync {
    /// Whether this backend will actually make requests
    fn enabled(&self) -> bool {
        true
    }

    /// Fetch the path between two points, in travel order
    fn directions(
        &self,
        start: Coordinates,
        end: Coordinates,
    ) -> impl Future<Output = Result<Vec<Coordinates>>> + Send;
}

/// OpenRouteService driving-car backend
#[derive(Clone)]
pub struct OpenRouteServiceBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// GeoJSON directions response (only the parts we draw)
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    /// [lng, lat] or [lng, lat, elevation]
    coordinates: Vec<Vec<f64>>,
}

impl OpenRouteServiceBackend {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(OPENROUTESERVICE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// ORS takes positions as "lng,lat"
    fn directions_url(&self, start: Coordinates, end: Coordinates) -> String {
        format!(
            "{}/v2/directions/driving-car?api_key={}&start={},{}&end={},{}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            start.lng,
            start.lat,
            end.lng,
            end.lat
        )
    }

    fn path(response: DirectionsResponse) -> Result<Vec<Coordinates>> {
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or_else(|| Error::Directions("No route found".to_string()))?;

        feature
            .geometry
            .coordinates
            .into_iter()
            .map(|position| match position.as_slice() {
                [lng, lat, ..] => Coordinates::checked(*lat, *lng),
                _ => Err(Error::Directions(format!(
                    "Malformed position in route: {:?}",
                    position
                ))),
            })
            .collect()
    }
}

impl std::fmt::Debug for OpenRouteServiceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouteServiceBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl DirectionsBackend for OpenRouteServiceBackend {
    async fn directions(&self, start: Coordinates, end: Coordinates) -> Result<Vec<Coordinates>> {
        let response = self
            .client
            .get(self.directions_url(start, end))
            .send()
            .await
            .map_err(|e| Error::Directions(format!("Directions request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Directions(format!(
                "Directions service returned status: {}",
                response.status()
            )));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| Error::Directions(format!("Failed to parse directions: {}", e)))?;

        Self::path(body)
    }
}

/// Directions backend selected by configuration
#[derive(Debug, Clone)]
pub enum Directions {
    OpenRouteService(OpenRouteServiceBackend),
    /// No API key configured; never requested
    Disabled,
}

impl DirectionsBackend for Directions {
    fn enabled(&self) -> bool {
        matches!(self, Self::OpenRouteService(_))
    }

    async fn directions(&self, start: Coordinates, end: Coordinates) -> Result<Vec<Coordinates>> {
        match self {
            Self::OpenRouteService(backend) => backend.directions(start, end).await,
            Self::Disabled => Err(Error::Directions(
                "Directions are disabled (no OpenRouteService key)".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_server::{spawn, UNREACHABLE};
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    #[test]
    fn test_directions_url_uses_lng_lat_order() {
        let backend = OpenRouteServiceBackend::with_base_url("http://ors.test", "key").unwrap();
        let url = backend.directions_url(
            Coordinates::new(51.505, -0.09),
            Coordinates::new(48.8566, 2.3522),
        );
        assert_eq!(
            url,
            "http://ors.test/v2/directions/driving-car?api_key=key&start=-0.09,51.505&end=2.3522,48.8566"
        );
    }

    #[test]
    fn test_path_parses_geojson() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[-0.09, 51.505], [1.0, 50.0, 12.5], [2.3522, 48.8566]]}
            }]
        }"#;
        let response: DirectionsResponse = serde_json::from_str(body).unwrap();

        let path = OpenRouteServiceBackend::path(response).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], Coordinates::new(51.505, -0.09));
        assert_eq!(path[2], Coordinates::new(48.8566, 2.3522));
    }

    #[test]
    fn test_path_rejects_empty_and_malformed() {
        let empty: DirectionsResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(OpenRouteServiceBackend::path(empty).is_err());

        let malformed: DirectionsResponse =
            serde_json::from_str(r#"{"features": [{"geometry": {"coordinates": [[1.0]]}}]}"#).unwrap();
        assert!(OpenRouteServiceBackend::path(malformed).is_err());
    }

    #[tokio::test]
    async fn test_directions_against_local_service() {
        let app = Router::new().route(
            "/v2/directions/driving-car",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("start").map(String::as_str), Some("-0.09,51.505"));
                Json(serde_json::json!({
                    "features": [{"geometry": {"coordinates": [[-0.09, 51.505], [2.3522, 48.8566]]}}]
                }))
            }),
        );
        let base = spawn(app).await;
        let backend = OpenRouteServiceBackend::with_base_url(base, "key").unwrap();

        let path = backend
            .directions(Coordinates::new(51.505, -0.09), Coordinates::new(48.8566, 2.3522))
            .await
            .unwrap();
        assert_eq!(path.len(), 2);
    }

    #[tokio::test]
    async fn test_directions_failure() {
        let backend = OpenRouteServiceBackend::with_base_url(UNREACHABLE, "key").unwrap();
        let result = backend
            .directions(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0))
            .await;
        assert!(matches!(result, Err(Error::Directions(_))));
    }

    #[tokio::test]
    async fn test_disabled_backend() {
        let disabled = Directions::Disabled;
        assert!(!disabled.enabled());
        assert!(disabled
            .directions(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0))
            .await
            .is_err());
    }
}
