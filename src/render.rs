//! Visual application layer.
//!
//! Takes resolved segments and stops and pushes them onto a map surface.
//! Geometry decisions all happen upstream; this module only styles, places
//! and rescales.

use crate::codec::RouteFeature;
use crate::config::{LineStyle, RouteConfig, RouteStyle};
use crate::midpoint::place_duration_badges;
use crate::polyline::{Bounds, Coordinate};
use crate::scaler::{MarkerKind, MarkerRegistry, MarkerVisual, ZoomUpdate};
use crate::stitcher::{
    prepare_stops, resolve_segments, ResolvedSegment, ResolvedSegments, SegmentFlags, SegmentKind,
    Stop,
};
use crate::traits::{DirectionsProvider, MapSurface, MarkerContent};

const FIT_PADDING: f64 = 0.08;

/// Secondary point of interest drawn as a mini marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiMarker {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Identifies the render generation a result was requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub layers: usize,
    pub markers: usize,
    pub badges: usize,
    /// Stops skipped for out-of-range coordinates.
    pub rejected: usize,
}

/// Everything needed to draw one tour.
#[derive(Debug, Clone, Copy)]
pub struct TourView<'a> {
    pub stops: &'a [Stop],
    pub start: Option<Coordinate>,
    pub start_label: &'a str,
    pub flags: SegmentFlags,
    pub custom: Option<&'a RouteFeature>,
    pub pois: &'a [PoiMarker],
}

pub struct RouteRenderer<M: MapSurface> {
    map: M,
    config: RouteConfig,
    style: RouteStyle,
    markers: MarkerRegistry,
    layers: Vec<String>,
    epoch: u64,
    zoom: Option<f64>,
}

impl<M: MapSurface> RouteRenderer<M> {
    pub fn new(map: M, config: RouteConfig, style: RouteStyle) -> Self {
        Self {
            map,
            config,
            style,
            markers: MarkerRegistry::new(),
            layers: Vec::new(),
            epoch: 0,
            zoom: None,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Starts a new render generation. Results tied to older tickets are
    /// dropped by `apply`.
    pub fn begin(&mut self) -> RenderTicket {
        self.epoch += 1;
        RenderTicket(self.epoch)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.epoch
    }

    /// Resolves and draws a tour in one go.
    pub fn render<P>(&mut self, provider: &P, view: &TourView<'_>) -> Option<RenderSummary>
    where
        P: DirectionsProvider + ?Sized,
    {
        let ticket = self.begin();
        let segments = resolve_segments(
            provider,
            view.stops,
            view.start,
            view.flags,
            view.custom,
            self.config.profile,
        );
        self.apply(ticket, &segments, view)
    }

    /// Replaces everything on the map with `segments` and the tour markers.
    ///
    /// Returns `None` without touching the map when `ticket` is stale.
    pub fn apply(
        &mut self,
        ticket: RenderTicket,
        segments: &ResolvedSegments,
        view: &TourView<'_>,
    ) -> Option<RenderSummary> {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, current = self.epoch, "dropping stale render result");
            return None;
        }

        self.clear_display();
        let mut summary = RenderSummary::default();

        for segment in segments.iter() {
            let source_id = format!("route-{}", segment.kind.as_str());
            let layer_id = format!("{}-line", source_id);
            let style = segment_style(&self.style, segments, segment);
            self.map.set_line_source(&source_id, &segment.geometry);
            self.map.upsert_line_layer(&layer_id, &source_id, style);
            self.layers.push(layer_id);
            summary.layers += 1;
        }

        let prepared = prepare_stops(view.stops);
        if let Some(start) = view.start {
            self.place(
                start,
                MarkerKind::Start,
                MarkerContent::Start {
                    label: view.start_label.to_string(),
                },
            );
        }
        for (index, stop) in prepared.stops.iter().enumerate() {
            self.place(
                stop.coordinate(),
                MarkerKind::Stop,
                MarkerContent::Stop {
                    number: index + 1,
                    label: stop.name.clone(),
                },
            );
        }
        for poi in view.pois {
            self.place(
                poi.coordinate,
                MarkerKind::Mini,
                MarkerContent::Mini {
                    label: poi.label.clone(),
                },
            );
        }

        if let Some(main) = &segments.main {
            let badges = place_duration_badges(
                &main.geometry,
                &prepared.stops,
                self.config.coincidence_threshold,
            );
            for badge in &badges {
                self.place(badge.position, MarkerKind::Badge, MarkerContent::Badge { text: badge.text() });
            }
            summary.badges = badges.len();
        }
        summary.markers = self.markers.len();
        summary.rejected = prepared.rejected.len();

        let mut extent: Vec<Coordinate> = segments
            .iter()
            .flat_map(|segment| segment.geometry.points().iter().copied())
            .collect();
        extent.extend(prepared.stops.iter().map(Stop::coordinate));
        if let Some(bounds) = Bounds::of_points(&extent) {
            self.map.fit_bounds(bounds.padded(FIT_PADDING));
        }

        if let Some(zoom) = self.zoom {
            self.markers.on_zoom(zoom, &self.config);
        }
        Some(summary)
    }

    /// Camera zoom-change handler. Synchronous and cheap.
    pub fn on_zoom(&mut self, zoom: f64) -> ZoomUpdate {
        self.zoom = Some(zoom);
        self.markers.on_zoom(zoom, &self.config)
    }

    /// Pans and zooms to a stop.
    pub fn focus(&mut self, at: Coordinate, zoom: f64) {
        self.map.ease_to(at, zoom);
    }

    /// Removes everything and invalidates outstanding tickets.
    pub fn teardown(&mut self) {
        self.epoch += 1;
        self.clear_display();
    }

    fn place(&mut self, at: Coordinate, kind: MarkerKind, content: MarkerContent) {
        let element = self.map.add_marker(at, &content);
        self.markers.register(MarkerVisual::new(kind, element));
    }

    fn clear_display(&mut self) {
        for layer in self.layers.drain(..) {
            self.map.remove_layer(&layer);
        }
        self.map.clear_markers();
        self.markers.clear();
    }
}

/// Line style for a segment; the approach style depends on whether it is
/// drawn as part of the tour.
pub fn segment_style<'a>(
    style: &'a RouteStyle,
    segments: &ResolvedSegments,
    segment: &ResolvedSegment,
) -> &'a LineStyle {
    match segment.kind {
        SegmentKind::Approach if segments.include_approach_in_route => &style.approach_in_route,
        SegmentKind::Approach => &style.approach_separate,
        SegmentKind::Main => &style.main,
        SegmentKind::Return => &style.return_leg,
    }
}
