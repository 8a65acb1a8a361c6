//! OSRM HTTP adapter for route directions.

use std::env;

use serde::Deserialize;

use crate::error::RouteError;
use crate::polyline::{Coordinate, Polyline};
use crate::traits::{Directions, DirectionsProvider, TravelProfile};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Reads `OSRM_BASE_URL` and `OSRM_TIMEOUT_SECS`, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("OSRM_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: env::var("OSRM_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Request URL for a route through `waypoints`.
    pub fn route_url(&self, waypoints: &[Coordinate], profile: TravelProfile) -> String {
        let coords = waypoints
            .iter()
            .map(|coord| format!("{:.6},{:.6}", coord.lng, coord.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            profile.osrm_profile(),
            coords
        )
    }
}

impl DirectionsProvider for OsrmClient {
    #[tracing::instrument(skip(self, waypoints), fields(waypoints = waypoints.len()))]
    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InvalidGeometry(waypoints.len()));
        }

        let body = self
            .client
            .get(self.route_url(waypoints, profile))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        body.into_directions()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Polyline,
}

impl OsrmRouteResponse {
    fn into_directions(self) -> Result<Directions, RouteError> {
        if self.code != "Ok" {
            return Err(RouteError::DirectionsUnavailable(format!(
                "{}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }

        let best = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::DirectionsUnavailable("no routes returned".to_string()))?;

        Ok(Directions {
            geometry: best.geometry.coordinates,
            distance: best.distance,
            duration: best.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://osrm.local/".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let url = client.route_url(
            &[Coordinate::new(-115.1728, 36.1147), Coordinate::new(-115.158, 36.1727)],
            TravelProfile::Walking,
        );
        assert_eq!(
            url,
            "http://osrm.local/route/v1/foot/-115.172800,36.114700;-115.158000,36.172700?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parses_first_route() {
        let body = r#"{
            "code": "Ok",
            "routes": [
                {"geometry": {"type": "LineString", "coordinates": [[-115.17, 36.11], [-115.16, 36.12], [-115.15, 36.13]]}, "distance": 2450.5, "duration": 1830.0},
                {"geometry": {"type": "LineString", "coordinates": [[-115.17, 36.11], [-115.15, 36.13]]}, "distance": 2600.0, "duration": 1900.0}
            ],
            "waypoints": []
        }"#;
        let response: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        let directions = response.into_directions().unwrap();
        assert_eq!(directions.geometry.len(), 3);
        assert_eq!(directions.distance, 2450.5);
        assert_eq!(directions.duration, 1830.0);
    }

    #[test]
    fn test_no_route_code_is_unavailable() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let response: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        match response.into_directions() {
            Err(RouteError::DirectionsUnavailable(reason)) => assert!(reason.contains("NoRoute")),
            other => panic!("expected DirectionsUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let result = client.directions(
            &[Coordinate::new(0.0, 0.0), Coordinate::new(0.001, 0.001)],
            TravelProfile::Driving,
        );
        assert!(matches!(result, Err(RouteError::DirectionsUnavailable(_))));
    }
}
