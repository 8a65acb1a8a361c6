//! Persisted route document: one GeoJSON `Feature` with a `LineString`.
//!
//! ```json
//! { "type": "Feature", "properties": {}, "geometry": { "type": "LineString", "coordinates": [[lng, lat], ...] } }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RouteConfig;
use crate::error::RouteError;
use crate::polyline::Polyline;
use crate::simplify::simplify;

/// The canonical route: a `LineString` feature with free-form properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFeature {
    pub properties: Map<String, Value>,
    pub coordinates: Polyline,
}

impl RouteFeature {
    pub fn new(coordinates: Polyline) -> Self {
        Self {
            properties: Map::new(),
            coordinates,
        }
    }
}

#[derive(Serialize)]
struct FeatureDoc<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: &'a Map<String, Value>,
    geometry: GeometryDoc<'a>,
}

#[derive(Serialize)]
struct GeometryDoc<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: &'a Polyline,
}

/// Serializes a feature to its persisted string form.
///
/// Never fails: properties are a string-keyed JSON map and coordinates are
/// plain number pairs.
pub fn encode(feature: &RouteFeature) -> String {
    let doc = FeatureDoc {
        kind: "Feature",
        properties: &feature.properties,
        geometry: GeometryDoc {
            kind: "LineString",
            coordinates: &feature.coordinates,
        },
    };
    serde_json::to_string(&doc).unwrap_or_default()
}

/// Parses and validates a persisted route document.
pub fn decode(document: &str) -> Result<RouteFeature, RouteError> {
    let value: Value = serde_json::from_str(document)?;

    match value.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        other => {
            return Err(RouteError::MalformedGeometry(format!(
                "expected a Feature, found {:?}",
                other
            )));
        }
    }

    let properties = match value.get("properties") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(RouteError::MalformedGeometry(
                "properties must be an object".to_string(),
            ));
        }
    };

    let geometry = value
        .get("geometry")
        .ok_or_else(|| RouteError::MalformedGeometry("missing geometry".to_string()))?;
    match geometry.get("type").and_then(Value::as_str) {
        Some("LineString") => {}
        other => {
            return Err(RouteError::MalformedGeometry(format!(
                "expected a LineString geometry, found {:?}",
                other
            )));
        }
    }

    let coordinates = geometry
        .get("coordinates")
        .cloned()
        .ok_or_else(|| RouteError::MalformedGeometry("missing coordinates".to_string()))?;
    let coordinates: Polyline = serde_json::from_value(coordinates)?;

    let feature = RouteFeature {
        properties,
        coordinates,
    };
    validate(&feature)?;
    Ok(feature)
}

/// Checks the persisted-route invariants: two or more in-range coordinates.
pub fn validate(feature: &RouteFeature) -> Result<(), RouteError> {
    let count = feature.coordinates.len();
    if count < 2 {
        return Err(RouteError::MalformedGeometry(format!(
            "a route needs at least 2 coordinates, got {}",
            count
        )));
    }
    if let Some(bad) = feature.coordinates.points().iter().find(|c| !c.in_range()) {
        return Err(RouteError::CoordinateOutOfRange {
            lng: bad.lng,
            lat: bad.lat,
        });
    }
    Ok(())
}

/// Reported when a committed route was reduced by the simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSimplified {
    pub from: usize,
    pub to: usize,
}

/// Result of committing a merged route.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedRoute {
    pub feature: RouteFeature,
    pub document: String,
    pub simplified: Option<RouteSimplified>,
}

/// Validates a merged route, simplifies it when it exceeds the configured
/// threshold, and encodes it.
pub fn commit(coordinates: Polyline, config: &RouteConfig) -> Result<CommittedRoute, RouteError> {
    if coordinates.len() < 2 {
        return Err(RouteError::InvalidGeometry(coordinates.len()));
    }

    let original = coordinates.len();
    let (coordinates, simplified) = if original > config.simplify_threshold {
        let reduced = simplify(&coordinates, config.simplify_tolerance);
        let report = RouteSimplified {
            from: original,
            to: reduced.len(),
        };
        tracing::info!(from = report.from, to = report.to, "route simplified");
        (reduced, Some(report))
    } else {
        (coordinates, None)
    };

    let feature = RouteFeature::new(coordinates);
    validate(&feature)?;
    let document = encode(&feature);

    Ok(CommittedRoute {
        feature,
        document,
        simplified,
    })
}
