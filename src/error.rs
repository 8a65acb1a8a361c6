//! Error taxonomy shared by the geometry pipeline.

use std::fmt;

#[derive(Debug)]
pub enum RouteError {
    /// Persisted document is unparseable or not a `LineString` feature.
    MalformedGeometry(String),
    /// Save attempted with no drawn lines.
    EmptyRoute,
    /// Merged geometry carries fewer than two coordinates.
    InvalidGeometry(usize),
    /// Session save attempted with fewer than two coordinates.
    InsufficientPoints(usize),
    /// Directions provider failed; callers fall back to straight lines.
    DirectionsUnavailable(String),
    /// Persistence collaborator rejected the document.
    PersistenceFailure(String),
    CoordinateOutOfRange { lng: f64, lat: f64 },
    /// Operation requires an open draw session.
    SessionClosed,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::MalformedGeometry(reason) => write!(f, "malformed geometry: {}", reason),
            RouteError::EmptyRoute => write!(f, "route has no drawn lines"),
            RouteError::InvalidGeometry(count) => {
                write!(f, "route needs at least 2 coordinates, got {}", count)
            }
            RouteError::InsufficientPoints(count) => {
                write!(f, "draw at least 2 points before saving, got {}", count)
            }
            RouteError::DirectionsUnavailable(reason) => {
                write!(f, "directions unavailable: {}", reason)
            }
            RouteError::PersistenceFailure(reason) => write!(f, "persistence failed: {}", reason),
            RouteError::CoordinateOutOfRange { lng, lat } => {
                write!(f, "coordinate out of range: ({}, {})", lng, lat)
            }
            RouteError::SessionClosed => write!(f, "draw session is closed"),
        }
    }
}

impl std::error::Error for RouteError {}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        RouteError::MalformedGeometry(err.to_string())
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        RouteError::DirectionsUnavailable(err.to_string())
    }
}
