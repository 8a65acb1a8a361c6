//! Export of a tour's stops as a flyover-camera project.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::stitcher::{prepare_stops, Stop};

/// Seconds of flyover footage budgeted per waypoint.
const SECONDS_PER_WAYPOINT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyoverWaypoint {
    pub waypoint_number: usize,
    pub poi_id: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyoverSettings {
    /// Metres above ground.
    pub default_altitude: f64,
    pub smoothing: f64,
    pub camera_mode: String,
    pub notes: String,
}

impl Default for FlyoverSettings {
    fn default() -> Self {
        Self {
            default_altitude: 150.0,
            smoothing: 0.5,
            camera_mode: "orbit".to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyoverProject {
    pub project_name: String,
    pub project_slug: String,
    pub export_date: String,
    pub total_waypoints: usize,
    /// Seconds.
    pub recommended_duration: usize,
    pub waypoints: Vec<FlyoverWaypoint>,
    pub settings: FlyoverSettings,
}

impl FlyoverProject {
    /// Builds a project from tour stops in tour order. Stops with
    /// out-of-range coordinates are left out.
    pub fn from_stops(name: &str, slug: &str, stops: &[Stop], exported_at: DateTime<Utc>) -> Self {
        let waypoints: Vec<FlyoverWaypoint> = prepare_stops(stops)
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| {
                let coord = stop.coordinate();
                FlyoverWaypoint {
                    waypoint_number: index + 1,
                    poi_id: stop.poi_id().map(str::to_string),
                    name: stop.name.clone(),
                    latitude: coord.lat,
                    longitude: coord.lng,
                    description: stop.description.clone().unwrap_or_default(),
                }
            })
            .collect();

        Self {
            project_name: name.to_string(),
            project_slug: slug.to_string(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_waypoints: waypoints.len(),
            recommended_duration: waypoints.len() * SECONDS_PER_WAYPOINT,
            waypoints,
            settings: FlyoverSettings::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, RouteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
