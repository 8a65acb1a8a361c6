//! Test fixtures for tour-route.
//!
//! Provides a walking tour along the Las Vegas Strip (coordinates from
//! OpenStreetMap) and helpers that fake a hand-drawn line through it.

pub mod strip_tour;

pub use strip_tour::*;
