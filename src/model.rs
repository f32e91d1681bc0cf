//! Request and response records for route processing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single GPS fix as received from the tracking source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            timestamp: None,
            vehicle_id: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// (lat, lng) pair.
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A point of the cleaned route with its derived annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPoint {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    /// km/h
    pub speed: Option<f64>,
    /// km
    pub distance_from_previous: Option<f64>,
}

impl ProcessedPoint {
    pub fn new(lat: f64, lng: f64, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            lat,
            lng,
            timestamp,
            place_name: None,
            speed: None,
            distance_from_previous: None,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// The annotated route produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub original_points: usize,
    pub processed_points: usize,
    pub route: Vec<ProcessedPoint>,
    pub encoded_polyline: String,
    pub total_distance_km: f64,
    pub estimated_duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub coordinates: Vec<Coordinate>,
    #[serde(default = "enabled")]
    pub simplify: bool,
    #[serde(default = "enabled", alias = "snapToRoads")]
    pub snap_to_roads: bool,
    #[serde(default = "enabled", alias = "reverseGeocode")]
    pub reverse_geocode: bool,
}

impl RouteRequest {
    /// A request with every stage enabled.
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self {
            coordinates,
            simplify: true,
            snap_to_roads: true,
            reverse_geocode: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Place name resolved for one coordinate of a batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub place_name: String,
}
