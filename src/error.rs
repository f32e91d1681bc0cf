//! Error types.
//!
//! Only [`RouteError`] is surfaced to callers of the pipeline. The remaining
//! errors are produced by individual stages and absorbed by the pipeline with
//! a degraded result.

use std::time::Duration;

use thiserror::Error;

/// Request-level failure.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("at least 2 coordinates required for route processing, got {0}")]
    TooFewCoordinates(usize),
    #[error("coordinate {index} out of range: lat={lat}, lng={lng}")]
    CoordinateOutOfRange { index: usize, lat: f64, lng: f64 },
    #[error("route processing exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

#[derive(Debug, Error, PartialEq)]
pub enum PolylineError {
    #[error("coordinate {index} is not finite")]
    NonFiniteCoordinate { index: usize },
    #[error("coordinate {index} does not fit the requested precision")]
    Overflow { index: usize },
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },
    #[error("polyline ends in the middle of a value")]
    Truncated,
    #[error("value at position {position} is too long")]
    ValueTooLong { position: usize },
    #[error("latitude without a matching longitude")]
    UnpairedLatitude,
    #[error("decoded coordinate overflows at position {position}")]
    CoordinateOverflow { position: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum SimplifyError {
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error("point {index} is not finite")]
    NonFinitePoint { index: usize },
}

/// Failure of the routing backend.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned code {0:?}")]
    Rejected(String),
    #[error("backend response had no usable result")]
    Empty,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request timed out")]
    Timeout,
    #[error("geocoding service error: {0}")]
    Service(String),
    #[error("no place found")]
    NotFound,
}

impl GeocodeError {
    /// Place name reported to clients in place of a real one.
    pub fn sentinel(&self) -> &'static str {
        match self {
            GeocodeError::Timeout => TIMEOUT_SENTINEL,
            GeocodeError::Service(_) => SERVICE_ERROR_SENTINEL,
            GeocodeError::NotFound => UNKNOWN_LOCATION,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else if err.is_decode() {
            GeocodeError::NotFound
        } else {
            GeocodeError::Service(err.to_string())
        }
    }
}

pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const TIMEOUT_SENTINEL: &str = "Geocoding Timeout";
pub const SERVICE_ERROR_SENTINEL: &str = "Geocoding Error";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(GeocodeError::Timeout.sentinel(), "Geocoding Timeout");
        assert_eq!(GeocodeError::Service("503".into()).sentinel(), "Geocoding Error");
        assert_eq!(GeocodeError::NotFound.sentinel(), "Unknown Location");
    }

    #[test]
    fn test_route_error_display() {
        let err = RouteError::TooFewCoordinates(1);
        assert!(err.to_string().contains("at least 2"));
    }
}
