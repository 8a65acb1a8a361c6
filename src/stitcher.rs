//! Segment stitching.
//!
//! Two halves: merging operator-drawn lines into one canonical path on save,
//! and resolving the approach / main / return segments of a tour on render.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::codec::RouteFeature;
use crate::error::RouteError;
use crate::polyline::{Coordinate, Polyline};
use crate::traits::{Directions, DirectionsProvider, TravelProfile};

/// Where a stop's coordinate comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StopLocation {
    /// Coordinate of a related point of interest.
    Poi { poi_id: String, coordinate: Coordinate },
    /// Coordinate stored directly on the waypoint.
    Free { coordinate: Coordinate },
}

/// A labeled anchor along the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    /// Sole ordering key. Equal values keep fetch order.
    pub order: i32,
    pub location: StopLocation,
    #[serde(default)]
    pub description: Option<String>,
    /// Travel time to the next stop, shown as a badge.
    #[serde(default)]
    pub minutes_to_next: Option<u32>,
}

impl Stop {
    pub fn free(id: &str, name: &str, order: i32, coordinate: Coordinate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            order,
            location: StopLocation::Free { coordinate },
            description: None,
            minutes_to_next: None,
        }
    }

    pub fn poi(id: &str, name: &str, order: i32, poi_id: &str, coordinate: Coordinate) -> Self {
        Self {
            location: StopLocation::Poi {
                poi_id: poi_id.to_string(),
                coordinate,
            },
            ..Self::free(id, name, order, coordinate)
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        match &self.location {
            StopLocation::Poi { coordinate, .. } | StopLocation::Free { coordinate } => *coordinate,
        }
    }

    pub fn poi_id(&self) -> Option<&str> {
        match &self.location {
            StopLocation::Poi { poi_id, .. } => Some(poi_id),
            StopLocation::Free { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct RejectedStop {
    pub id: String,
    pub error: RouteError,
}

/// Stops in tour order, plus those dropped for bad coordinates.
#[derive(Debug, Default)]
pub struct PreparedStops {
    pub stops: Vec<Stop>,
    pub rejected: Vec<RejectedStop>,
}

impl PreparedStops {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.stops.iter().map(Stop::coordinate).collect()
    }
}

/// Orders stops by `order` (stable, so ties keep fetch order) and rejects any
/// whose coordinate is out of range. Rejected stops are never clamped.
pub fn prepare_stops(stops: &[Stop]) -> PreparedStops {
    let mut prepared = PreparedStops::default();
    for stop in stops {
        let coord = stop.coordinate();
        match Coordinate::checked(coord.lng, coord.lat) {
            Ok(_) => prepared.stops.push(stop.clone()),
            Err(error) => {
                tracing::warn!(stop = %stop.id, %error, "rejecting stop");
                prepared.rejected.push(RejectedStop {
                    id: stop.id.clone(),
                    error,
                });
            }
        }
    }
    prepared.stops.sort_by_key(|stop| stop.order);
    prepared
}

/// Joins drawn lines end to end, in the order the surface retained them.
///
/// No endpoint matching or deduplication is done.
pub fn merge_drawn_lines(lines: &[Polyline]) -> Result<Polyline, RouteError> {
    let merged = match lines {
        [] => return Err(RouteError::EmptyRoute),
        [single] => single.clone(),
        many => {
            let mut merged = Polyline::new(Vec::with_capacity(many.iter().map(Polyline::len).sum()));
            for line in many {
                merged.extend_from(line);
            }
            merged
        }
    };

    if merged.len() < 2 {
        return Err(RouteError::InvalidGeometry(merged.len()));
    }
    Ok(merged)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Approach,
    Main,
    Return,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Approach => "approach",
            SegmentKind::Main => "main",
            SegmentKind::Return => "return",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentFlags {
    /// Draw the approach in the main tour style. Does not affect fetching.
    pub include_approach_in_route: bool,
    /// Resolve and draw the leg from the last stop back to the start.
    pub show_return_route: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    Directions,
    /// Hand-drawn route supplied by the caller.
    Custom,
    /// Directions failed; anchors joined by straight lines.
    StraightLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSegment {
    pub kind: SegmentKind,
    pub anchors: Vec<Coordinate>,
    pub geometry: Polyline,
    pub source: GeometrySource,
    /// Metres, when a provider reported it.
    pub distance: Option<f64>,
    /// Seconds, when a provider reported it.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSegments {
    pub approach: Option<ResolvedSegment>,
    pub main: Option<ResolvedSegment>,
    pub return_leg: Option<ResolvedSegment>,
    pub include_approach_in_route: bool,
    /// Ids of stops left out for out-of-range coordinates.
    pub rejected_stops: Vec<String>,
}

impl ResolvedSegments {
    /// Present segments in approach, main, return order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedSegment> {
        [&self.approach, &self.main, &self.return_leg]
            .into_iter()
            .flatten()
    }
}

/// Anchor lists for each present segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub kind: SegmentKind,
    pub anchors: Vec<Coordinate>,
}

/// Splits an ordered stop list into approach / main / return anchor lists.
pub fn partition_segments(
    stops: &[Coordinate],
    start: Option<Coordinate>,
    flags: SegmentFlags,
) -> Vec<SegmentPlan> {
    let mut plans = Vec::with_capacity(3);
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return plans;
    };

    if let Some(start) = start {
        plans.push(SegmentPlan {
            kind: SegmentKind::Approach,
            anchors: vec![start, *first],
        });
    }
    if stops.len() >= 2 {
        plans.push(SegmentPlan {
            kind: SegmentKind::Main,
            anchors: stops.to_vec(),
        });
    }
    if let (Some(start), true) = (start, flags.show_return_route) {
        plans.push(SegmentPlan {
            kind: SegmentKind::Return,
            anchors: vec![*last, start],
        });
    }
    plans
}

/// Resolves each segment's geometry.
///
/// Custom geometry replaces the main segment without a directions call; the
/// approach and return legs still go through `provider`. Provider failures
/// fall back to the straight line through the segment's anchors.
pub fn resolve_segments<P>(
    provider: &P,
    stops: &[Stop],
    start: Option<Coordinate>,
    flags: SegmentFlags,
    custom: Option<&RouteFeature>,
    profile: TravelProfile,
) -> ResolvedSegments
where
    P: DirectionsProvider + ?Sized,
{
    let prepared = prepare_stops(stops);
    let coords = prepared.coordinates();
    let mut plans = partition_segments(&coords, start, flags);

    if custom.is_some() && !coords.is_empty() && !plans.iter().any(|p| p.kind == SegmentKind::Main) {
        let index = usize::from(plans.first().map(|p| p.kind) == Some(SegmentKind::Approach));
        plans.insert(
            index,
            SegmentPlan {
                kind: SegmentKind::Main,
                anchors: coords.clone(),
            },
        );
    }

    let resolved: Vec<ResolvedSegment> = plans
        .into_par_iter()
        .map(|plan| match (plan.kind, custom) {
            (SegmentKind::Main, Some(feature)) => ResolvedSegment {
                kind: plan.kind,
                geometry: feature.coordinates.clone(),
                anchors: plan.anchors,
                source: GeometrySource::Custom,
                distance: None,
                duration: None,
            },
            _ => resolve_plan(provider, plan, profile),
        })
        .collect();

    let mut segments = ResolvedSegments {
        include_approach_in_route: flags.include_approach_in_route,
        rejected_stops: prepared.rejected.into_iter().map(|rejected| rejected.id).collect(),
        ..ResolvedSegments::default()
    };
    for segment in resolved {
        match segment.kind {
            SegmentKind::Approach => segments.approach = Some(segment),
            SegmentKind::Main => segments.main = Some(segment),
            SegmentKind::Return => segments.return_leg = Some(segment),
        }
    }
    segments
}

fn resolve_plan<P>(provider: &P, plan: SegmentPlan, profile: TravelProfile) -> ResolvedSegment
where
    P: DirectionsProvider + ?Sized,
{
    match provider.directions(&plan.anchors, profile) {
        Ok(directions) if directions.geometry.len() >= 2 => ResolvedSegment {
            kind: plan.kind,
            anchors: plan.anchors,
            geometry: directions.geometry,
            source: GeometrySource::Directions,
            distance: Some(directions.distance),
            duration: Some(directions.duration),
        },
        outcome => {
            let reason = match outcome {
                Err(err) => err.to_string(),
                Ok(_) => "provider returned fewer than 2 coordinates".to_string(),
            };
            tracing::warn!(segment = plan.kind.as_str(), %reason, "directions unavailable, using straight line");
            ResolvedSegment {
                kind: plan.kind,
                geometry: Polyline::new(plan.anchors.clone()),
                anchors: plan.anchors,
                source: GeometrySource::StraightLine,
                distance: None,
                duration: None,
            }
        }
    }
}

/// Splits anchors into runs of at most `max` points; adjacent runs share
/// their boundary point so the chunks join into one path.
pub fn chunk_waypoints(anchors: &[Coordinate], max: usize) -> Vec<Vec<Coordinate>> {
    let max = max.max(2);
    if anchors.len() <= max {
        return vec![anchors.to_vec()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start + 1 < anchors.len() {
        let end = (start + max).min(anchors.len());
        chunks.push(anchors[start..end].to_vec());
        start = end - 1;
    }
    chunks
}

/// Concatenates chunk geometries, skipping a chunk's first point when it
/// repeats the previous chunk's last point.
pub fn join_chunks(parts: &[Polyline]) -> Polyline {
    let mut joined = Polyline::default();
    for part in parts {
        let skip = usize::from(joined.last().is_some() && joined.last() == part.first());
        for coord in &part.points()[skip.min(part.len())..] {
            joined.push(*coord);
        }
    }
    joined
}

/// Wraps a provider and splits requests above its waypoint ceiling.
#[derive(Debug, Clone)]
pub struct ChunkedDirections<P> {
    pub inner: P,
    pub max_waypoints: usize,
}

impl<P: DirectionsProvider> DirectionsProvider for ChunkedDirections<P> {
    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions, RouteError> {
        let chunks = chunk_waypoints(waypoints, self.max_waypoints);
        if chunks.len() == 1 {
            return self.inner.directions(waypoints, profile);
        }

        let mut parts = Vec::with_capacity(chunks.len());
        let mut distance = 0.0;
        let mut duration = 0.0;
        for chunk in &chunks {
            let directions = self.inner.directions(chunk, profile)?;
            distance += directions.distance;
            duration += directions.duration;
            parts.push(directions.geometry);
        }

        Ok(Directions {
            geometry: join_chunks(&parts),
            distance,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::haversine::StraightLine;

    /// Returns the anchors with a detour point inserted after the first.
    struct DetourProvider {
        calls: AtomicUsize,
    }

    impl DetourProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DirectionsProvider for DetourProvider {
        fn directions(
            &self,
            waypoints: &[Coordinate],
            _profile: TravelProfile,
        ) -> Result<Directions, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut points = waypoints.to_vec();
            let detour = Coordinate::new(waypoints[0].lng, waypoints[0].lat + 0.001);
            points.insert(1, detour);
            Ok(Directions {
                geometry: Polyline::new(points),
                distance: 100.0,
                duration: 60.0,
            })
        }
    }

    struct FailingProvider;

    impl DirectionsProvider for FailingProvider {
        fn directions(&self, _: &[Coordinate], _: TravelProfile) -> Result<Directions, RouteError> {
            Err(RouteError::DirectionsUnavailable("connection refused".to_string()))
        }
    }

    fn c(lng: f64, lat: f64) -> Coordinate {
        Coordinate::new(lng, lat)
    }

    fn tour() -> Vec<Stop> {
        vec![
            Stop::free("b", "Bellagio", 2, c(-115.1767, 36.1126)),
            Stop::poi("a", "Wynn", 1, "poi-7", c(-115.1658, 36.1264)),
            Stop::free("c", "MGM Grand", 3, c(-115.1689, 36.1024)),
        ]
    }

    #[test]
    fn test_merge_single_line_unchanged() {
        let line = Polyline::from_pairs(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
        assert_eq!(merge_drawn_lines(&[line.clone()]).unwrap(), line);
    }

    #[test]
    fn test_merge_concatenates_without_dedup() {
        let line_a = Polyline::from_pairs(&[[0.0, 0.0], [1.0, 1.0]]);
        let line_b = Polyline::from_pairs(&[[1.0, 1.0], [2.0, 2.0]]);
        let merged = merge_drawn_lines(&[line_a, line_b]).unwrap();
        assert_eq!(
            merged,
            Polyline::from_pairs(&[[0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [2.0, 2.0]])
        );
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_merge_errors() {
        assert!(matches!(merge_drawn_lines(&[]), Err(RouteError::EmptyRoute)));
        let dot = Polyline::from_pairs(&[[0.0, 0.0]]);
        assert!(matches!(
            merge_drawn_lines(&[dot.clone()]),
            Err(RouteError::InvalidGeometry(1))
        ));
        assert!(merge_drawn_lines(&[dot.clone(), dot]).is_ok());
    }

    #[test]
    fn test_prepare_orders_by_order_field_with_stable_ties() {
        let stops = vec![
            Stop::free("x", "X", 2, c(0.0, 0.0)),
            Stop::free("y", "Y", 1, c(0.0, 0.0)),
            Stop::free("z", "Z", 2, c(0.0, 0.0)),
            Stop::free("w", "W", 1, c(0.0, 0.0)),
        ];
        let prepared = prepare_stops(&stops);
        let ids: Vec<&str> = prepared.stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_prepare_rejects_out_of_range() {
        let stops = vec![
            Stop::free("ok", "Ok", 1, c(-115.0, 36.0)),
            Stop::free("bad", "Bad", 2, c(-115.0, 96.0)),
        ];
        let prepared = prepare_stops(&stops);
        assert_eq!(prepared.stops.len(), 1);
        assert_eq!(prepared.rejected.len(), 1);
        assert_eq!(prepared.rejected[0].id, "bad");
        assert!(matches!(
            prepared.rejected[0].error,
            RouteError::CoordinateOutOfRange { .. }
        ));
    }

    #[test]
    fn test_partition() {
        let start = c(9.0, 9.0);
        let stops = vec![c(1.0, 1.0), c(2.0, 2.0), c(3.0, 3.0)];

        let plans = partition_segments(&stops, Some(start), SegmentFlags::default());
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].anchors, vec![start, c(1.0, 1.0)]);
        assert_eq!(plans[1].anchors, stops);

        let flags = SegmentFlags {
            show_return_route: true,
            ..SegmentFlags::default()
        };
        let plans = partition_segments(&stops, Some(start), flags);
        assert_eq!(plans[2].kind, SegmentKind::Return);
        assert_eq!(plans[2].anchors, vec![c(3.0, 3.0), start]);

        let single = partition_segments(&stops[..1], Some(start), flags);
        let kinds: Vec<SegmentKind> = single.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Approach, SegmentKind::Return]);

        assert!(partition_segments(&[], Some(start), flags).is_empty());
        assert_eq!(partition_segments(&stops, None, flags).len(), 1);
    }

    #[test]
    fn test_resolve_uses_directions_per_segment() {
        let provider = DetourProvider::new();
        let flags = SegmentFlags {
            include_approach_in_route: true,
            show_return_route: true,
        };
        let start = c(-115.15, 36.17);
        let segments = resolve_segments(&provider, &tour(), Some(start), flags, None, TravelProfile::Walking);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let main = segments.main.as_ref().unwrap();
        assert_eq!(main.source, GeometrySource::Directions);
        assert_eq!(main.anchors[0], c(-115.1658, 36.1264));
        assert_eq!(main.geometry.len(), 4);
        assert_eq!(main.duration, Some(60.0));
        assert!(segments.include_approach_in_route);
        assert_eq!(segments.iter().count(), 3);
    }

    #[test]
    fn test_custom_geometry_replaces_main_only() {
        let provider = DetourProvider::new();
        let custom = RouteFeature::new(Polyline::from_pairs(&[
            [-115.1658, 36.1264],
            [-115.17, 36.12],
            [-115.1767, 36.1126],
            [-115.1689, 36.1024],
        ]));
        let flags = SegmentFlags {
            show_return_route: true,
            ..SegmentFlags::default()
        };
        let segments = resolve_segments(
            &provider,
            &tour(),
            Some(c(-115.15, 36.17)),
            flags,
            Some(&custom),
            TravelProfile::Walking,
        );

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        let main = segments.main.unwrap();
        assert_eq!(main.source, GeometrySource::Custom);
        assert_eq!(main.geometry, custom.coordinates);
        assert_eq!(segments.approach.unwrap().source, GeometrySource::Directions);
        assert_eq!(segments.return_leg.unwrap().source, GeometrySource::Directions);
    }

    #[test]
    fn test_custom_geometry_with_single_stop_still_draws_main() {
        let custom = RouteFeature::new(Polyline::from_pairs(&[[0.0, 0.0], [0.5, 0.5]]));
        let stops = vec![Stop::free("a", "A", 1, c(0.0, 0.0))];
        let segments = resolve_segments(
            &StraightLine::default(),
            &stops,
            Some(c(1.0, 1.0)),
            SegmentFlags::default(),
            Some(&custom),
            TravelProfile::Walking,
        );
        let kinds: Vec<SegmentKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Approach, SegmentKind::Main]);
    }

    #[test]
    fn test_failed_directions_fall_back_to_straight_line() {
        let flags = SegmentFlags {
            show_return_route: true,
            ..SegmentFlags::default()
        };
        let start = c(-115.15, 36.17);
        let segments = resolve_segments(&FailingProvider, &tour(), Some(start), flags, None, TravelProfile::Driving);

        for segment in segments.iter() {
            assert_eq!(segment.source, GeometrySource::StraightLine);
            assert_eq!(segment.geometry.points(), &segment.anchors[..]);
            assert!(segment.duration.is_none());
        }
        assert_eq!(
            segments.return_leg.unwrap().geometry,
            Polyline::new(vec![c(-115.1689, 36.1024), start])
        );
    }

    #[test]
    fn test_resolve_reports_rejected_stops() {
        let mut stops = tour();
        stops.push(Stop::free("off-map", "Off map", 0, c(-215.0, 36.1)));
        let segments = resolve_segments(
            &StraightLine::default(),
            &stops,
            None,
            SegmentFlags::default(),
            None,
            TravelProfile::Walking,
        );

        assert_eq!(segments.rejected_stops, vec!["off-map".to_string()]);
        assert_eq!(segments.main.unwrap().anchors.len(), tour().len());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let provider = DetourProvider::new();
        let flags = SegmentFlags {
            include_approach_in_route: false,
            show_return_route: true,
        };
        let start = Some(c(-115.15, 36.17));
        let first = resolve_segments(&provider, &tour(), start, flags, None, TravelProfile::Cycling);
        let second = resolve_segments(&provider, &tour(), start, flags, None, TravelProfile::Cycling);
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_waypoints_shares_boundaries() {
        let anchors: Vec<Coordinate> = (0..60).map(|i| c(i as f64, 0.0)).collect();
        let chunks = chunk_waypoints(&anchors, 25);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 25));
        assert_eq!(chunks[0].last(), chunks[1].first());
        assert_eq!(chunks[1].last(), chunks[2].first());
        assert_eq!(chunks[2].last(), anchors.last());

        let joined = join_chunks(
            &chunks
                .iter()
                .map(|chunk| Polyline::new(chunk.clone()))
                .collect::<Vec<_>>(),
        );
        assert_eq!(joined.points(), &anchors[..]);
    }

    #[test]
    fn test_chunk_small_input_is_single_chunk() {
        let anchors = vec![c(0.0, 0.0), c(1.0, 1.0)];
        assert_eq!(chunk_waypoints(&anchors, 25), vec![anchors]);
    }

    #[test]
    fn test_chunked_provider_sums_legs() {
        let provider = ChunkedDirections {
            inner: StraightLine::default(),
            max_waypoints: 3,
        };
        let anchors: Vec<Coordinate> = (0..7).map(|i| c(i as f64 * 0.01, 0.0)).collect();
        let chunked = provider.directions(&anchors, TravelProfile::Walking).unwrap();
        let direct = StraightLine::default()
            .directions(&anchors, TravelProfile::Walking)
            .unwrap();
        assert_eq!(chunked.geometry, direct.geometry);
        assert!((chunked.distance - direct.distance).abs() < 1e-6);
    }
}
