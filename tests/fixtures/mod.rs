//! Test fixtures for route-refiner.
//!
//! Provides a recorded drive along the Las Vegas Strip and helpers to turn
//! it into request coordinates.

pub mod strip_drive;

pub use strip_drive::*;
