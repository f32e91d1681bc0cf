//! OSRM HTTP adapter for road snapping and duration estimates.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CollaboratorError;
use crate::haversine::round_to;
use crate::traits::{DurationEstimator, RoadSnapper};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn service_url(&self, service: &str, locations: &[(f64, f64)]) -> String {
        let coords = locations
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            service,
            self.config.profile,
            coords
        )
    }
}

impl RoadSnapper for OsrmClient {
    fn snap(&self, coordinates: &[(f64, f64)]) -> Result<Vec<(f64, f64)>, CollaboratorError> {
        if coordinates.len() < 2 {
            return Ok(coordinates.to_vec());
        }

        let body = self
            .client
            .get(self.service_url("match", coordinates))
            .query(&[("overview", "full"), ("geometries", "geojson"), ("steps", "false")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmMatchResponse>())?;

        let snapped = body.into_geometry()?;
        info!(from = coordinates.len(), to = snapped.len(), "snapped route to roads");
        Ok(snapped)
    }
}

impl DurationEstimator for OsrmClient {
    fn estimate_minutes(&self, start: (f64, f64), end: (f64, f64)) -> Result<f64, CollaboratorError> {
        let body = self
            .client
            .get(self.service_url("route", &[start, end]))
            .query(&[("overview", "false"), ("steps", "false")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        let minutes = body.into_minutes()?;
        info!(minutes, "estimated route duration");
        Ok(minutes)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmMatchResponse {
    code: String,
    #[serde(default)]
    matchings: Vec<OsrmMatching>,
}

#[derive(Debug, Deserialize)]
struct OsrmMatching {
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    /// `[lng, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

impl OsrmMatchResponse {
    pub(crate) fn into_geometry(self) -> Result<Vec<(f64, f64)>, CollaboratorError> {
        if self.code != "Ok" {
            warn!(code = %self.code, "OSRM match failed");
            return Err(CollaboratorError::Rejected(self.code));
        }

        let matching = self.matchings.into_iter().next().ok_or(CollaboratorError::Empty)?;
        let points: Vec<(f64, f64)> = matching
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| (lat, lng))
            .collect();

        if points.is_empty() {
            return Err(CollaboratorError::Empty);
        }
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Seconds.
    duration: f64,
}

impl OsrmRouteResponse {
    pub(crate) fn into_minutes(self) -> Result<f64, CollaboratorError> {
        if self.code != "Ok" {
            warn!(code = %self.code, "OSRM route failed");
            return Err(CollaboratorError::Rejected(self.code));
        }

        let route = self.routes.first().ok_or(CollaboratorError::Empty)?;
        Ok(round_to(route.duration / 60.0, 2))
    }
}
