//! Label placement along a route line.

use crate::polyline::{Coordinate, Polyline};
use crate::stitcher::Stop;

/// Returns the sampled point of `route_line` at roughly half the arc length
/// between the points nearest `anchor_a` and `anchor_b`.
///
/// The result is the earlier of the two points bracketing the halfway
/// distance; no interpolation happens inside the final segment. `None` when
/// the anchors do not map to a forward sub-path.
pub fn locate_midpoint(
    route_line: &Polyline,
    anchor_a: &Coordinate,
    anchor_b: &Coordinate,
) -> Option<Coordinate> {
    let points = route_line.points();
    let start_idx = nearest_index(points, anchor_a)?;
    let end_idx = start_idx + nearest_index(&points[start_idx..], anchor_b)?;
    if end_idx <= start_idx {
        return None;
    }

    let sub_path = &points[start_idx..=end_idx];
    let mut cumulative = Vec::with_capacity(sub_path.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for pair in sub_path.windows(2) {
        total += pair[0].distance_to(&pair[1]);
        cumulative.push(total);
    }

    let half = total / 2.0;
    let bracket = cumulative
        .windows(2)
        .position(|pair| pair[0] <= half && half <= pair[1])
        .unwrap_or(0);
    Some(sub_path[bracket])
}

/// First index holding the point closest to `target`.
fn nearest_index(points: &[Coordinate], target: &Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate() {
        let distance = point.distance_to(target);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Travel-time badge between two consecutive stops.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBadge {
    pub from_stop: String,
    pub to_stop: String,
    pub position: Coordinate,
    pub minutes: u32,
}

impl DurationBadge {
    pub fn text(&self) -> String {
        format!("{} min", self.minutes)
    }
}

/// Places one badge per stop-to-stop transition that has a duration.
///
/// `stops` must already be in tour order. Transitions whose anchors are
/// within `coincidence_threshold` of each other get no badge.
pub fn place_duration_badges(
    route_line: &Polyline,
    stops: &[Stop],
    coincidence_threshold: f64,
) -> Vec<DurationBadge> {
    stops
        .windows(2)
        .filter_map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let minutes = from.minutes_to_next?;
            let (a, b) = (from.coordinate(), to.coordinate());
            if a.distance_to(&b) < coincidence_threshold {
                return None;
            }
            let position = locate_midpoint(route_line, &a, &b)?;
            Some(DurationBadge {
                from_stop: from.id.clone(),
                to_stop: to.id.clone(),
                position,
                minutes,
            })
        })
        .collect()
}
