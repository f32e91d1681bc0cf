//! Route processing pipeline.
//!
//! Raw fixes flow through simplification, optional road snapping,
//! per-point enrichment (distance, speed, place name), polyline encoding and
//! an optional duration estimate. Only invalid input and an exceeded deadline
//! fail a request; every collaborator or computation failure degrades to the
//! best data available and is logged.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::RouteError;
use crate::haversine::{distance_km, round_to, speed_kmh};
use crate::model::{Coordinate, GeocodeResult, ProcessedPoint, Route, RouteRequest};
use crate::polyline;
use crate::simplify::{DEFAULT_TOLERANCE, simplify_indices};
use crate::traits::{DurationEstimator, GeocodePolicy, ReverseGeocoder, RoadSnapper};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Douglas-Peucker tolerance in degrees.
    pub tolerance: f64,
    pub geocode_policy: GeocodePolicy,
    pub estimate_duration: bool,
    /// Upper bound on the wall time of a single request.
    pub deadline: Option<Duration>,
    /// Concurrent lookups in [`geocode_batch`]. Public Nominatim allows one
    /// request per second; raise this only for a self-hosted geocoder.
    pub batch_workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            geocode_policy: GeocodePolicy::default(),
            estimate_duration: true,
            deadline: None,
            batch_workers: 1,
        }
    }
}

/// A position on the working route and the time it was recorded, if known.
type Fix = ((f64, f64), Option<DateTime<Utc>>);

pub fn process_route<S, D, G>(
    request: &RouteRequest,
    snapper: &S,
    estimator: &D,
    geocoder: &G,
    options: &PipelineOptions,
) -> Result<Route, RouteError>
where
    S: RoadSnapper,
    D: DurationEstimator,
    G: ReverseGeocoder,
{
    validate(&request.coordinates)?;

    let started = Instant::now();
    let original_points = request.coordinates.len();
    info!(points = original_points, "processing route");

    let mut fixes: Vec<Fix> = request
        .coordinates
        .iter()
        .map(|coord| (coord.position(), coord.timestamp))
        .collect();

    if request.simplify && fixes.len() > 2 {
        fixes = simplify_fixes(fixes, options.tolerance);
        info!(points = fixes.len(), "simplified route");
    }

    if request.snap_to_roads {
        fixes = snap_fixes(fixes, snapper, original_points, options.tolerance);
        check_deadline(started, options.deadline)?;
    }

    let mut points: Vec<ProcessedPoint> = Vec::with_capacity(fixes.len());
    let mut total_distance = 0.0;

    for (index, &((lat, lng), timestamp)) in fixes.iter().enumerate() {
        let mut point = ProcessedPoint::new(lat, lng, timestamp);

        if let Some(previous) = points.last() {
            let distance = distance_km(previous.position(), point.position());
            point.distance_from_previous = Some(distance);
            total_distance += distance;

            if point.timestamp.is_some() && previous.timestamp.is_some() {
                point.speed = Some(speed_kmh(previous, &point));
            }
        }

        if request.reverse_geocode && options.geocode_policy.applies_to(index, fixes.len()) {
            point.place_name = Some(place_name(geocoder, lat, lng));
            check_deadline(started, options.deadline)?;
        }

        points.push(point);
    }

    let positions: Vec<(f64, f64)> = points.iter().map(ProcessedPoint::position).collect();
    let encoded_polyline = polyline::encode(&positions).unwrap_or_else(|err| {
        error!(error = %err, "error encoding polyline");
        String::new()
    });

    let estimated_duration_minutes = if options.estimate_duration {
        let duration = estimate_duration(estimator, &positions);
        check_deadline(started, options.deadline)?;
        duration
    } else {
        None
    };

    let total_distance_km = round_to(total_distance, 3);
    info!(
        points = points.len(),
        total_distance_km,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "route processed"
    );

    Ok(Route {
        original_points,
        processed_points: points.len(),
        route: points,
        encoded_polyline,
        total_distance_km,
        estimated_duration_minutes,
    })
}

/// Resolves a place name for every coordinate, in input order.
///
/// Lookups run on a dedicated pool of `options.batch_workers` threads;
/// failures are reported with the geocoder's sentinel name.
pub fn geocode_batch<G>(
    coordinates: &[Coordinate],
    geocoder: &G,
    options: &PipelineOptions,
) -> Result<Vec<GeocodeResult>, RouteError>
where
    G: ReverseGeocoder + Sync,
{
    check_ranges(coordinates)?;

    let lookup = |coord: &Coordinate| GeocodeResult {
        lat: coord.lat,
        lng: coord.lng,
        timestamp: coord.timestamp,
        place_name: place_name(geocoder, coord.lat, coord.lng),
    };

    if options.batch_workers <= 1 {
        return Ok(coordinates.iter().map(lookup).collect());
    }

    match ThreadPoolBuilder::new().num_threads(options.batch_workers).build() {
        Ok(pool) => Ok(pool.install(|| coordinates.par_iter().map(lookup).collect())),
        Err(err) => {
            warn!(error = %err, "could not start geocoding pool, looking up sequentially");
            Ok(coordinates.iter().map(lookup).collect())
        }
    }
}

fn validate(coordinates: &[Coordinate]) -> Result<(), RouteError> {
    if coordinates.len() < 2 {
        return Err(RouteError::TooFewCoordinates(coordinates.len()));
    }
    check_ranges(coordinates)
}

fn check_ranges(coordinates: &[Coordinate]) -> Result<(), RouteError> {
    match coordinates.iter().position(|coord| !coord.in_range()) {
        Some(index) => Err(RouteError::CoordinateOutOfRange {
            index,
            lat: coordinates[index].lat,
            lng: coordinates[index].lng,
        }),
        None => Ok(()),
    }
}

fn check_deadline(started: Instant, deadline: Option<Duration>) -> Result<(), RouteError> {
    match deadline {
        Some(limit) if started.elapsed() > limit => {
            warn!(?limit, "route processing deadline exceeded");
            Err(RouteError::DeadlineExceeded(limit))
        }
        _ => Ok(()),
    }
}

fn simplify_fixes(fixes: Vec<Fix>, tolerance: f64) -> Vec<Fix> {
    let positions: Vec<(f64, f64)> = fixes.iter().map(|(position, _)| *position).collect();
    match simplify_indices(&positions, tolerance) {
        Ok(indices) => indices.into_iter().map(|i| fixes[i]).collect(),
        Err(err) => {
            error!(error = %err, "error simplifying route, keeping all points");
            fixes
        }
    }
}

/// Replaces the working fixes with the snapped geometry when the snapper
/// succeeds and the geometry fits within `max_points`.
fn snap_fixes<S: RoadSnapper>(fixes: Vec<Fix>, snapper: &S, max_points: usize, tolerance: f64) -> Vec<Fix> {
    let positions: Vec<(f64, f64)> = fixes.iter().map(|(position, _)| *position).collect();

    let snapped = match snapper.snap(&positions) {
        Ok(snapped) if !snapped.is_empty() => snapped,
        Ok(_) => {
            warn!("road snapping returned no points, using original coordinates");
            return fixes;
        }
        Err(err) => {
            warn!(error = %err, "road snapping failed, using original coordinates");
            return fixes;
        }
    };

    let Some(snapped) = fit_point_budget(snapped, max_points, tolerance) else {
        warn!(max_points, "snapped geometry exceeds input size, using original coordinates");
        return fixes;
    };
    info!(points = snapped.len(), "snapped to roads");

    // Timestamps only carry over when the snapped points pair up one-to-one.
    if snapped.len() == fixes.len() {
        snapped
            .into_iter()
            .zip(fixes)
            .map(|(position, (_, timestamp))| (position, timestamp))
            .collect()
    } else {
        snapped.into_iter().map(|position| (position, None)).collect()
    }
}

fn fit_point_budget(points: Vec<(f64, f64)>, max_points: usize, tolerance: f64) -> Option<Vec<(f64, f64)>> {
    if points.len() <= max_points {
        return Some(points);
    }

    let indices = simplify_indices(&points, tolerance).ok()?;
    debug!(from = points.len(), to = indices.len(), "re-simplified snapped geometry");
    (indices.len() <= max_points).then(|| indices.into_iter().map(|i| points[i]).collect())
}

fn place_name<G: ReverseGeocoder>(geocoder: &G, lat: f64, lng: f64) -> String {
    geocoder.reverse_geocode(lat, lng).unwrap_or_else(|err| {
        warn!(lat, lng, error = %err, "geocoding failed");
        err.sentinel().to_string()
    })
}

fn estimate_duration<D: DurationEstimator>(estimator: &D, positions: &[(f64, f64)]) -> Option<f64> {
    let (&start, &end) = (positions.first()?, positions.last()?);
    match estimator.estimate_minutes(start, end) {
        Ok(minutes) => Some(minutes),
        Err(err) => {
            warn!(error = %err, "duration estimation failed");
            None
        }
    }
}
