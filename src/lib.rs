//! route-refiner
//!
//! Turns a raw sequence of vehicle GPS fixes into a cleaned, annotated route:
//! simplified and optionally road-snapped geometry, per-point distance, speed
//! and place names, an encoded polyline and a trip duration estimate.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod haversine;
pub mod model;
pub mod osrm;
pub mod pipeline;
pub mod polyline;
pub mod simplify;
pub mod traits;

pub use error::RouteError;
pub use model::{Coordinate, GeocodeResult, ProcessedPoint, Route, RouteRequest};
pub use pipeline::{PipelineOptions, geocode_batch, process_route};
