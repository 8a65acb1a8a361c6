//! Draw capture session.
//!
//! One session per opening of the editing surface. The session owns the
//! surface handle and every drawn feature; nothing outlives `close`.
//! Re-opening builds a new session from the latest persisted document.

use crate::codec::{self, CommittedRoute, RouteFeature};
use crate::config::RouteConfig;
use crate::error::RouteError;
use crate::polyline::{Bounds, Polyline};
use crate::stitcher::merge_drawn_lines;
use crate::traits::{DrawSurface, RouteStore};

/// Padding applied around a loaded route when fitting the camera.
const FIT_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    /// Open with nothing drawn.
    Empty,
    /// A line is being drawn but has fewer than two points.
    Drawing,
    HasFeature,
}

/// Events emitted by the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Create { id: String, coordinates: Polyline },
    Update { id: String, coordinates: Polyline },
    Delete { id: String },
}

pub struct DrawSession<S: DrawSurface> {
    route_id: String,
    config: RouteConfig,
    surface: S,
    state: SessionState,
    /// Drawn lines in the order the surface retained them.
    features: Vec<(String, Polyline)>,
    current: Option<RouteFeature>,
    /// Committed route whose persistence failed, kept for retry.
    pending: Option<CommittedRoute>,
}

impl<S: DrawSurface> DrawSession<S> {
    /// Opens a session, loading `persisted` into the surface when present.
    pub fn open(
        route_id: impl Into<String>,
        mut surface: S,
        persisted: Option<&str>,
        config: RouteConfig,
    ) -> Result<Self, RouteError> {
        surface.clear();
        let mut session = Self {
            route_id: route_id.into(),
            config,
            surface,
            state: SessionState::Empty,
            features: Vec::new(),
            current: None,
            pending: None,
        };

        if let Some(document) = persisted.filter(|doc| !doc.trim().is_empty()) {
            let feature = codec::decode(document)?;
            let id = session.surface.load(&feature);
            if let Some(bounds) = Bounds::of(&feature.coordinates) {
                session.surface.fit_bounds(bounds.padded(FIT_PADDING));
            }
            session.features.push((id, feature.coordinates.clone()));
            session.current = Some(feature);
            session.state = SessionState::HasFeature;
        }

        tracing::debug!(route = %session.route_id, state = ?session.state, "draw session opened");
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn current_feature(&self) -> Option<&RouteFeature> {
        self.current.as_ref()
    }

    /// Coordinate count of the current feature, shown while drawing.
    pub fn point_count(&self) -> usize {
        self.current
            .as_ref()
            .map_or(0, |feature| feature.coordinates.len())
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn pending(&self) -> Option<&CommittedRoute> {
        self.pending.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Applies a create/update/delete event from the drawing surface.
    ///
    /// Any route kept from a failed save is dropped; the next retry commits
    /// the lines as they are now.
    pub fn handle(&mut self, event: DrawEvent) -> Result<SessionState, RouteError> {
        self.ensure_open()?;
        self.pending = None;

        match event {
            DrawEvent::Create { id, coordinates } | DrawEvent::Update { id, coordinates } => {
                match self.features.iter_mut().find(|(existing, _)| *existing == id) {
                    Some((_, line)) => *line = coordinates.clone(),
                    None => self.features.push((id, coordinates.clone())),
                }
                self.current = Some(RouteFeature::new(coordinates));
            }
            DrawEvent::Delete { id } => {
                self.features.retain(|(existing, _)| *existing != id);
                self.current = self
                    .features
                    .last()
                    .map(|(_, line)| RouteFeature::new(line.clone()));
            }
        }

        self.state = match &self.current {
            None => SessionState::Empty,
            Some(feature) if feature.coordinates.len() < 2 => SessionState::Drawing,
            Some(_) => SessionState::HasFeature,
        };
        tracing::debug!(state = ?self.state, points = self.point_count(), "draw event applied");
        Ok(self.state)
    }

    /// Merges every drawn line, commits and persists the route, then closes.
    ///
    /// Validation failures leave the session open. A persistence failure also
    /// leaves it open and keeps the committed route for `retry_save`.
    pub fn save<R: RouteStore + ?Sized>(&mut self, store: &mut R) -> Result<CommittedRoute, RouteError> {
        self.ensure_open()?;

        let lines: Vec<Polyline> = self.features.iter().map(|(_, line)| line.clone()).collect();
        let merged = merge_drawn_lines(&lines).map_err(|err| match err {
            RouteError::InvalidGeometry(count) => RouteError::InsufficientPoints(count),
            other => other,
        })?;

        let committed = codec::commit(merged, &self.config)?;
        self.persist(store, committed)
    }

    /// Resubmits the route kept after a failed save, or saves afresh when
    /// lines changed since.
    pub fn retry_save<R: RouteStore + ?Sized>(
        &mut self,
        store: &mut R,
    ) -> Result<CommittedRoute, RouteError> {
        self.ensure_open()?;
        match self.pending.take() {
            Some(committed) => self.persist(store, committed),
            None => self.save(store),
        }
    }

    fn persist<R: RouteStore + ?Sized>(
        &mut self,
        store: &mut R,
        committed: CommittedRoute,
    ) -> Result<CommittedRoute, RouteError> {
        match store.save(&self.route_id, &committed.document) {
            Ok(()) => {
                tracing::info!(route = %self.route_id, points = committed.feature.coordinates.len(), "route saved");
                self.close();
                Ok(committed)
            }
            Err(err) => {
                let reason = match err {
                    RouteError::PersistenceFailure(reason) => reason,
                    other => other.to_string(),
                };
                tracing::warn!(route = %self.route_id, %reason, "route save failed, keeping result for retry");
                self.pending = Some(committed);
                Err(RouteError::PersistenceFailure(reason))
            }
        }
    }

    /// Removes every drawn line but keeps the session open.
    pub fn clear(&mut self) -> Result<(), RouteError> {
        self.ensure_open()?;
        self.surface.clear();
        self.features.clear();
        self.current = None;
        self.pending = None;
        self.state = SessionState::Empty;
        Ok(())
    }

    /// Discards the session without persisting anything.
    pub fn cancel(&mut self) {
        if self.is_open() {
            tracing::debug!(route = %self.route_id, "draw session cancelled");
            self.close();
        }
    }

    fn close(&mut self) {
        self.surface.clear();
        self.features.clear();
        self.current = None;
        self.pending = None;
        self.state = SessionState::Closed;
    }

    fn ensure_open(&self) -> Result<(), RouteError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RouteError::SessionClosed)
        }
    }
}
