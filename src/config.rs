//! Environment-driven service configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::geocoding::{GeocoderConfig, NominatimGeocoder};
use crate::osrm::{OsrmClient, OsrmConfig};
use crate::pipeline::PipelineOptions;

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub osrm: OsrmConfig,
    pub geocoder: GeocoderConfig,
    pub pipeline: PipelineOptions,
}

impl ServiceConfig {
    /// Reads overrides from the process environment. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("OSRM_API_URL") {
            config.osrm.base_url = url;
        }
        if let Some(profile) = lookup("OSRM_PROFILE") {
            config.osrm.profile = profile;
        }
        if let Some(secs) = parse(&lookup, "OSRM_TIMEOUT_SECS")? {
            config.osrm.timeout_secs = secs;
        }

        if let Some(url) = lookup("GEOCODER_URL") {
            config.geocoder.base_url = url;
        }
        if let Some(agent) = lookup("GEOCODER_USER_AGENT") {
            config.geocoder.user_agent = agent;
        }
        if let Some(secs) = parse(&lookup, "GEOCODER_TIMEOUT_SECS")? {
            config.geocoder.timeout_secs = secs;
        }
        if let Some(secs) = parse(&lookup, "GEOCODER_CACHE_TTL_SECS")? {
            config.geocoder.cache_ttl_secs = secs;
        }
        if let Some(capacity) = parse(&lookup, "GEOCODER_CACHE_CAPACITY")? {
            config.geocoder.cache_capacity = capacity;
        }

        if let Some(secs) = parse::<u64, _>(&lookup, "ROUTE_DEADLINE_SECS")? {
            config.pipeline.deadline = Some(Duration::from_secs(secs));
        }
        if let Some(workers) = parse(&lookup, "GEOCODER_BATCH_WORKERS")? {
            config.pipeline.batch_workers = workers;
        }

        Ok(config)
    }

    pub fn osrm_client(&self) -> Result<OsrmClient, ConfigError> {
        Ok(OsrmClient::new(self.osrm.clone())?)
    }

    pub fn geocoder(&self) -> Result<NominatimGeocoder, ConfigError> {
        Ok(NominatimGeocoder::new(self.geocoder.clone())?)
    }
}

fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.osrm.base_url, "http://router.project-osrm.org");
        assert_eq!(config.osrm.timeout_secs, 30);
        assert_eq!(config.geocoder.cache_capacity, 10_000);
        assert_eq!(config.geocoder.cache_ttl_secs, 86_400);
        assert_eq!(config.pipeline.deadline, None);
        assert_eq!(config.pipeline.batch_workers, 1);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("OSRM_API_URL", "http://localhost:5000"),
            ("OSRM_PROFILE", "car"),
            ("GEOCODER_CACHE_CAPACITY", "50"),
            ("ROUTE_DEADLINE_SECS", " 45 "),
            ("GEOCODER_BATCH_WORKERS", "4"),
        ]))
        .unwrap();

        assert_eq!(config.osrm.base_url, "http://localhost:5000");
        assert_eq!(config.osrm.profile, "car");
        assert_eq!(config.geocoder.cache_capacity, 50);
        assert_eq!(config.pipeline.deadline, Some(Duration::from_secs(45)));
        assert_eq!(config.pipeline.batch_workers, 4);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("OSRM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "OSRM_TIMEOUT_SECS", .. }));
    }
}
