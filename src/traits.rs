//! Interfaces to the external services the route pipeline consumes.
//!
//! Implementations own their transport, timeouts and caching. The pipeline
//! treats every error returned here as non-fatal.

use crate::error::{CollaboratorError, GeocodeError};

/// Aligns an ordered list of (lat, lng) fixes to the road network.
///
/// The returned geometry keeps the travel order but may contain a different
/// number of points than the input.
pub trait RoadSnapper {
    fn snap(&self, coordinates: &[(f64, f64)]) -> Result<Vec<(f64, f64)>, CollaboratorError>;
}

/// Estimates the travel time between two (lat, lng) points.
pub trait DurationEstimator {
    /// Estimated duration in minutes.
    fn estimate_minutes(&self, start: (f64, f64), end: (f64, f64)) -> Result<f64, CollaboratorError>;
}

/// Resolves a coordinate to a human-readable place name.
pub trait ReverseGeocoder {
    fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, GeocodeError>;
}

/// Geocoding policy for the points of a processed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeocodePolicy {
    /// Every point of the route.
    All,
    /// First and last point only, to stay within provider rate limits.
    #[default]
    EndpointsOnly,
}

impl GeocodePolicy {
    pub fn applies_to(self, index: usize, len: usize) -> bool {
        match self {
            GeocodePolicy::All => true,
            GeocodePolicy::EndpointsOnly => index == 0 || index + 1 == len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_only() {
        let policy = GeocodePolicy::EndpointsOnly;
        let selected: Vec<usize> = (0..5).filter(|&i| policy.applies_to(i, 5)).collect();
        assert_eq!(selected, vec![0, 4]);
        assert!(policy.applies_to(0, 1));
    }

    #[test]
    fn test_all() {
        assert!((0..5).all(|i| GeocodePolicy::All.applies_to(i, 5)));
        assert_eq!(GeocodePolicy::default(), GeocodePolicy::EndpointsOnly);
    }
}
