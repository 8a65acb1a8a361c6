//! Collaborator seams for the route pipeline.
//!
//! The geometry code never talks to a network, a content store or a map
//! engine directly. Hosts implement these traits for their own services.

use serde::{Deserialize, Serialize};

use crate::codec::RouteFeature;
use crate::config::LineStyle;
use crate::error::RouteError;
use crate::polyline::{Bounds, Coordinate, Polyline};

/// Travel mode passed to the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    Walking,
    Cycling,
    Driving,
}

impl TravelProfile {
    /// Profile segment used in OSRM request paths.
    pub fn osrm_profile(&self) -> &'static str {
        match self {
            TravelProfile::Walking => "foot",
            TravelProfile::Cycling => "bike",
            TravelProfile::Driving => "car",
        }
    }

    /// Assumed average speed when no road network is available.
    pub fn assumed_speed_kmh(&self) -> f64 {
        match self {
            TravelProfile::Walking => 5.0,
            TravelProfile::Cycling => 15.0,
            TravelProfile::Driving => 40.0,
        }
    }
}

/// Best path returned by a directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub geometry: Polyline,
    /// Metres.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

/// Turns an ordered anchor list into a travel path.
///
/// Implementations receive two or more waypoints. Callers are responsible for
/// staying under the provider's per-request waypoint ceiling.
pub trait DirectionsProvider: Sync {
    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions, RouteError>;
}

/// Stores encoded route documents.
pub trait RouteStore {
    fn save(&mut self, route_id: &str, document: &str) -> Result<(), RouteError>;
}

/// Interactive drawing surface driven by a draw session.
///
/// Create/update/delete events flow the other way, from the host into
/// `DrawSession::handle`.
pub trait DrawSurface {
    /// Shows a previously persisted route as an editable feature and returns
    /// the id the surface gave it. Later events for that feature carry this id.
    fn load(&mut self, feature: &RouteFeature) -> String;
    fn fit_bounds(&mut self, bounds: Bounds);
    /// Removes every drawn feature.
    fn clear(&mut self);
}

/// Pixel sizes applied to one marker element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSizes {
    pub container: f64,
    pub icon: f64,
    pub badge: f64,
    pub badge_font: f64,
}

impl MarkerSizes {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            container: self.container * factor,
            icon: self.icon * factor,
            badge: self.badge * factor,
            badge_font: self.badge_font * factor,
        }
    }
}

/// An on-screen marker element owned by the map engine.
///
/// Each call applies all of its values or none of them; `false` means the
/// element is no longer attached and nothing changed.
pub trait MarkerElement {
    fn apply_sizes(&mut self, sizes: &MarkerSizes) -> bool;
    fn set_visible(&mut self, visible: bool) -> bool;
    fn set_label_visible(&mut self, visible: bool) -> bool;
}

/// What a placed marker represents.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerContent {
    /// Numbered tour stop with a label.
    Stop { number: usize, label: String },
    /// Start location of the tour.
    Start { label: String },
    /// Secondary point of interest.
    Mini { label: String },
    /// Travel-time badge between two stops.
    Badge { text: String },
}

/// Map engine capabilities used by the render layer.
pub trait MapSurface {
    fn set_line_source(&mut self, source_id: &str, line: &Polyline);
    fn upsert_line_layer(&mut self, layer_id: &str, source_id: &str, style: &LineStyle);
    fn remove_layer(&mut self, layer_id: &str);
    fn add_marker(&mut self, at: Coordinate, content: &MarkerContent) -> Box<dyn MarkerElement>;
    fn clear_markers(&mut self);
    fn fit_bounds(&mut self, bounds: Bounds);
    fn ease_to(&mut self, center: Coordinate, zoom: f64);
}
