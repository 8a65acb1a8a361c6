//! tour-route core
//!
//! Geometry pipeline for multi-stop tour routes: capture and simplify drawn
//! paths, persist them as GeoJSON, and stitch approach / main / return
//! segments for display.

pub mod error;
pub mod polyline;
pub mod config;
pub mod traits;
pub mod simplify;
pub mod codec;
pub mod stitcher;
pub mod midpoint;
pub mod scaler;
pub mod session;
pub mod render;
pub mod osrm;
pub mod osrm_data;
pub mod haversine;
pub mod flyover;
