//! Great-circle distance, derived speed, and a straight-line duration
//! estimator (fallback when no routing backend is configured).

use crate::error::CollaboratorError;
use crate::model::ProcessedPoint;
use crate::traits::DurationEstimator;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two (lat, lng) points in kilometers,
/// rounded to 3 decimals.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to(EARTH_RADIUS_KM * c, 3)
}

/// Speed in km/h needed to cover `current.distance_from_previous` between the
/// two timestamps, rounded to 2 decimals.
///
/// Returns 0.0 when either timestamp is missing or no time has elapsed.
/// A missing `distance_from_previous` counts as 0 km.
pub fn speed_kmh(previous: &ProcessedPoint, current: &ProcessedPoint) -> f64 {
    let (Some(start), Some(end)) = (previous.timestamp, current.timestamp) else {
        return 0.0;
    };

    let hours = (end - start).num_milliseconds() as f64 / 1000.0 / 3600.0;
    // Out-of-order fixes are treated like simultaneous ones.
    if hours <= 0.0 {
        return 0.0;
    }

    let distance = current.distance_from_previous.unwrap_or(0.0);
    round_to(distance / hours, 2)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Duration estimator based on straight-line distance and an assumed speed.
///
/// Less accurate than a routing backend (ignores roads) but always available.
#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn km_to_minutes(&self, km: f64) -> f64 {
        round_to(km / self.speed_kmh * 60.0, 2)
    }
}

impl DurationEstimator for HaversineEstimator {
    fn estimate_minutes(&self, start: (f64, f64), end: (f64, f64)) -> Result<f64, CollaboratorError> {
        if self.speed_kmh.is_nan() || self.speed_kmh <= 0.0 {
            return Err(CollaboratorError::Empty);
        }
        Ok(self.km_to_minutes(distance_km(start, end)))
    }
}
