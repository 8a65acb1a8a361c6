//! Tunables for the geometry pipeline and the render layer.

use crate::traits::TravelProfile;

#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Committed routes with more coordinates than this are simplified.
    pub simplify_threshold: usize,
    /// Simplification tolerance, in degrees.
    pub simplify_tolerance: f64,
    /// Anchors closer than this (degrees) are treated as the same place.
    pub coincidence_threshold: f64,
    /// Stop labels are shown at or above this zoom.
    pub label_min_zoom: f64,
    /// Mini/secondary markers are shown at or above this zoom.
    pub mini_marker_min_zoom: f64,
    /// Provider ceiling on anchors per directions request.
    pub max_waypoints_per_request: usize,
    pub profile: TravelProfile,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            simplify_threshold: 100,
            simplify_tolerance: crate::simplify::DEFAULT_TOLERANCE,
            coincidence_threshold: 0.0001,
            label_min_zoom: 13.0,
            mini_marker_min_zoom: 12.0,
            max_waypoints_per_request: 25,
            profile: TravelProfile::Walking,
        }
    }
}

/// Paint properties for one line layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub dashed: bool,
}

impl LineStyle {
    fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            opacity: 0.9,
            dashed: false,
        }
    }
}

/// Line styles for each route segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStyle {
    pub main: LineStyle,
    /// Approach drawn as part of the tour.
    pub approach_in_route: LineStyle,
    /// Approach drawn as a separate lead-in.
    pub approach_separate: LineStyle,
    pub return_leg: LineStyle,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            main: LineStyle::solid("#e4572e", 5.0),
            approach_in_route: LineStyle::solid("#e4572e", 5.0),
            approach_separate: LineStyle {
                opacity: 0.7,
                dashed: true,
                ..LineStyle::solid("#6c757d", 3.0)
            },
            return_leg: LineStyle {
                opacity: 0.6,
                dashed: true,
                ..LineStyle::solid("#4a7bd0", 3.0)
            },
        }
    }
}
