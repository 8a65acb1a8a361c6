//! Douglas-Peucker polyline simplification in degree space.
//!
//! Distances are measured against the infinite line through the span
//! endpoints, not the clamped segment. No unit conversion is done, so callers
//! pick a tolerance in degrees (0.0001 is roughly ten metres).

use crate::polyline::{Coordinate, Polyline};

pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Simplifies `points`, always keeping the first and last coordinate.
///
/// Negative or NaN tolerances are treated as zero.
pub fn simplify(points: &Polyline, tolerance: f64) -> Polyline {
    if points.len() <= 2 {
        return points.clone();
    }
    Polyline::new(simplify_span(points.points(), tolerance.max(0.0)))
}

fn simplify_span(points: &[Coordinate], tolerance: f64) -> Vec<Coordinate> {
    let first = points[0];
    let last = points[points.len() - 1];
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut max_distance = 0.0;
    let mut max_index = 0;
    for (index, point) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let distance = perpendicular_distance(point, &first, &last);
        if distance > max_distance {
            max_distance = distance;
            max_index = index;
        }
    }

    if max_distance > tolerance {
        let mut left = simplify_span(&points[..=max_index], tolerance);
        let right = simplify_span(&points[max_index..], tolerance);
        // Shared split point appears at the end of `left` and the start of `right`.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Distance from `point` to the line through `start` and `end`.
pub fn perpendicular_distance(point: &Coordinate, start: &Coordinate, end: &Coordinate) -> f64 {
    let dx = end.lng - start.lng;
    let dy = end.lat - start.lat;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return point.distance_to(start);
    }

    let u = ((point.lng - start.lng) * dx + (point.lat - start.lat) * dy) / length_sq;
    let projected = Coordinate::new(start.lng + u * dx, start.lat + u * dy);
    point.distance_to(&projected)
}
