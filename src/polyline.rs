//! Coordinate and polyline value types for route geometries.
//!
//! Coordinates are stored in GeoJSON order, (longitude, latitude), and
//! serialize as two-element arrays so a `Polyline` can be dropped straight
//! into a `LineString` geometry.

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// A single (longitude, latitude) position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lng: f64, lat: f64) -> Result<Self, RouteError> {
        let coord = Self::new(lng, lat);
        if coord.in_range() {
            Ok(coord)
        } else {
            Err(RouteError::CoordinateOutOfRange { lng, lat })
        }
    }

    pub fn in_range(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Planar distance in degree space.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = self.lng - other.lng;
        let dy = self.lat - other.lat;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self::new(lng, lat)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lng, coord.lat]
    }
}

/// An ordered path of coordinates. Insertion order is path order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Builds a polyline from `[lng, lat]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Self {
        pairs.iter().copied().map(Coordinate::from).collect()
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Coordinate> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    pub fn push(&mut self, coord: Coordinate) {
        self.points.push(coord);
    }

    pub fn extend_from(&mut self, other: &Polyline) {
        self.points.extend_from_slice(&other.points);
    }

    /// Sum of planar segment lengths in degree space.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

impl FromIterator<Coordinate> for Polyline {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Axis-aligned bounding box of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Bounds {
    /// Bounds of every point in the polyline, or `None` when it is empty.
    pub fn of(polyline: &Polyline) -> Option<Self> {
        Self::of_points(polyline.points())
    }

    pub fn of_points(points: &[Coordinate]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for coord in rest {
            bounds.min.lng = bounds.min.lng.min(coord.lng);
            bounds.min.lat = bounds.min.lat.min(coord.lat);
            bounds.max.lng = bounds.max.lng.max(coord.lng);
            bounds.max.lat = bounds.max.lat.max(coord.lat);
        }
        Some(bounds)
    }

    /// Grows the box by `fraction` of its span on every side.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad_lng = (self.max.lng - self.min.lng) * fraction;
        let pad_lat = (self.max.lat - self.min.lat) * fraction;
        Bounds {
            min: Coordinate::new(self.min.lng - pad_lng, self.min.lat - pad_lat),
            max: Coordinate::new(self.max.lng + pad_lng, self.max.lat + pad_lat),
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min.lng + self.max.lng) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }
}
