//! IP-based geolocation
//!
//! Uses ip-api.com to approximate where the user is. Every call hits the
//! network; nothing is cached between calls.

use crate::constants::api::IP_API_URL;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::position::PositionSource;
use crate::geo::{http_client, GeoLocation};
use serde::Deserialize;

/// IP location service
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

impl IpLocator {
    /// Create a new IP locator
    pub fn new() -> Result<Self> {
        Self::with_url(IP_API_URL)
    }

    /// Create an IP locator against a different endpoint
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            url: url.into(),
        })
    }

    /// Get current location based on IP address
    pub async fn locate(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Geolocation(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geolocation(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::Geolocation(format!("Failed to parse IP location response: {}", e))
        })?;

        Self::into_location(data)
    }

    fn into_location(data: IpApiResponse) -> Result<GeoLocation> {
        if data.status != "success" {
            return Err(Error::Geolocation(format!(
                "IP location lookup failed: {}",
                data.message.as_deref().unwrap_or("unknown reason")
            )));
        }

        let lat = data
            .lat
            .ok_or_else(|| Error::Geolocation("No latitude in response".to_string()))?;
        let lng = data
            .lon
            .ok_or_else(|| Error::Geolocation("No longitude in response".to_string()))?;

        // Build display name from available fields
        let display_name = [data.city, data.region_name, data.country]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeoLocation {
            lat,
            lng,
            display_name: if display_name.is_empty() {
                "Unknown Location".to_string()
            } else {
                display_name
            },
        })
    }
}

impl PositionSource for IpLocator {
    async fn current_position(&self) -> Result<Coordinates> {
        let location = self.locate().await?;
        let coords = location.coords();
        coords
            .validate()
            .map_err(|e| Error::Geolocation(e.to_string()))?;
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_server::{spawn, UNREACHABLE};
    use axum::{routing::get, Json, Router};

    fn parse(body: &str) -> IpApiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_into_location_success() {
        let data = parse(
            r#"{"status": "success", "lat": 52.52, "lon": 13.405, "city": "Berlin", "regionName": "Land Berlin", "country": "Germany"}"#,
        );
        let location = IpLocator::into_location(data).unwrap();
        assert_eq!(location.lat, 52.52);
        assert_eq!(location.display_name, "Berlin, Land Berlin, Germany");
    }

    #[test]
    fn test_into_location_without_names() {
        let data = parse(r#"{"status": "success", "lat": 1.0, "lon": 2.0}"#);
        let location = IpLocator::into_location(data).unwrap();
        assert_eq!(location.display_name, "Unknown Location");
    }

    #[test]
    fn test_into_location_failure() {
        let data = parse(r#"{"status": "fail", "message": "private range"}"#);
        let err = IpLocator::into_location(data).unwrap_err();
        assert!(err.to_string().contains("private range"));

        let data = parse(r#"{"status": "success", "lon": 2.0}"#);
        assert!(IpLocator::into_location(data).is_err());
    }

    #[tokio::test]
    async fn test_current_position_against_local_service() {
        let app = Router::new().route(
            "/json",
            get(|| async {
                Json(serde_json::json!({"status": "success", "lat": 48.8566, "lon": 2.3522, "city": "Paris"}))
            }),
        );
        let base = spawn(app).await;
        let locator = IpLocator::with_url(format!("{}/json", base)).unwrap();

        let coords = locator.current_position().await.unwrap();
        assert_eq!(coords, Coordinates::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn test_current_position_unreachable() {
        let locator = IpLocator::with_url(UNREACHABLE).unwrap();
        assert!(matches!(
            locator.current_position().await,
            Err(Error::Geolocation(_))
        ));
    }
}
