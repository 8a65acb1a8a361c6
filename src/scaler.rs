//! Zoom-responsive marker sizing and visibility.
//!
//! Runs on every camera zoom event, so nothing here blocks or allocates per
//! marker beyond the size struct handed to the element.

use crate::config::RouteConfig;
use crate::traits::{MarkerElement, MarkerSizes};

/// Size multiplier for a camera zoom level.
pub fn compute_scale_factor(zoom: f64) -> f64 {
    if zoom >= 16.0 {
        3.0
    } else if zoom >= 15.0 {
        2.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Stop,
    Start,
    Mini,
    Badge,
}

impl MarkerKind {
    /// Sizes at scale factor 1.
    pub fn base_sizes(&self) -> MarkerSizes {
        match self {
            MarkerKind::Stop | MarkerKind::Start => MarkerSizes {
                container: 32.0,
                icon: 18.0,
                badge: 16.0,
                badge_font: 10.0,
            },
            MarkerKind::Mini => MarkerSizes {
                container: 16.0,
                icon: 10.0,
                badge: 0.0,
                badge_font: 0.0,
            },
            MarkerKind::Badge => MarkerSizes {
                container: 44.0,
                icon: 0.0,
                badge: 20.0,
                badge_font: 11.0,
            },
        }
    }
}

/// A placed marker element and the sizes it had at factor 1.
pub struct MarkerVisual {
    pub kind: MarkerKind,
    pub base: MarkerSizes,
    pub element: Box<dyn MarkerElement>,
}

impl MarkerVisual {
    pub fn new(kind: MarkerKind, element: Box<dyn MarkerElement>) -> Self {
        Self {
            kind,
            base: kind.base_sizes(),
            element,
        }
    }
}

impl std::fmt::Debug for MarkerVisual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerVisual")
            .field("kind", &self.kind)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Applies `base * factor` to every marker. Returns how many elements took
/// the update; detached elements are left untouched.
pub fn apply_scale(markers: &mut [MarkerVisual], factor: f64) -> usize {
    let mut applied = 0;
    for marker in markers.iter_mut() {
        if marker.element.apply_sizes(&marker.base.scaled(factor)) {
            applied += 1;
        }
    }
    applied
}

/// Outcome of one zoom event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomUpdate {
    pub factor: f64,
    pub labels_visible: bool,
    pub minis_visible: bool,
    pub applied: usize,
}

/// Markers currently on the map.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: Vec<MarkerVisual>,
    factor: Option<f64>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, visual: MarkerVisual) {
        self.markers.push(visual);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Factor applied by the last zoom event, if any.
    pub fn current_factor(&self) -> Option<f64> {
        self.factor
    }

    /// Drops every handle; the map engine removes the elements themselves.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.factor = None;
    }

    /// Rescales markers and applies the label and mini-marker zoom gates.
    pub fn on_zoom(&mut self, zoom: f64, config: &RouteConfig) -> ZoomUpdate {
        let factor = compute_scale_factor(zoom);
        if self.factor != Some(factor) {
            tracing::debug!(zoom, factor, "marker scale tier changed");
        }
        self.factor = Some(factor);

        let labels_visible = zoom >= config.label_min_zoom;
        let minis_visible = zoom >= config.mini_marker_min_zoom;

        let applied = apply_scale(&mut self.markers, factor);
        for marker in &mut self.markers {
            match marker.kind {
                MarkerKind::Stop | MarkerKind::Start => {
                    marker.element.set_label_visible(labels_visible);
                }
                MarkerKind::Mini => {
                    marker.element.set_visible(minis_visible);
                }
                MarkerKind::Badge => {}
            }
        }

        ZoomUpdate {
            factor,
            labels_visible,
            minis_visible,
            applied,
        }
    }
}
