//! Straight-line directions (fallback when no routing service is available).
//!
//! Uses great-circle distance and an assumed per-profile speed to estimate
//! travel time. The path is the anchors themselves.

use crate::error::RouteError;
use crate::polyline::{Coordinate, Polyline};
use crate::traits::{Directions, DirectionsProvider, TravelProfile};

/// Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in metres.
pub fn haversine_m(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Great-circle length of a path in metres.
pub fn path_length_m(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_m(&pair[0], &pair[1]))
        .sum()
}

/// Directions provider that connects anchors with straight lines.
#[derive(Debug, Clone, Default)]
pub struct StraightLine {
    /// Overrides the profile's assumed speed, in km/h.
    pub speed_kmh: Option<f64>,
}

impl StraightLine {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            speed_kmh: Some(speed_kmh),
        }
    }

    fn seconds_for(&self, metres: f64, profile: TravelProfile) -> f64 {
        let speed = self.speed_kmh.unwrap_or_else(|| profile.assumed_speed_kmh());
        let hours = (metres / 1000.0) / speed;
        (hours * 3600.0).round()
    }
}

impl DirectionsProvider for StraightLine {
    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InvalidGeometry(waypoints.len()));
        }
        let distance = path_length_m(waypoints);
        Ok(Directions {
            geometry: Polyline::new(waypoints.to_vec()),
            distance,
            duration: self.seconds_for(distance, profile),
        })
    }
}
