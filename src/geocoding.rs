//! Nominatim reverse geocoding adapter with a shared result cache.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::error::GeocodeError;
use crate::traits::ReverseGeocoder;

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub language: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("route_refiner/", env!("CARGO_PKG_VERSION")).to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 24 * 60 * 60,
            cache_capacity: 10_000,
        }
    }
}

#[derive(Debug)]
pub struct NominatimGeocoder {
    config: GeocoderConfig,
    client: reqwest::blocking::Client,
    cache: TtlCache<String, String>,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        let cache = TtlCache::new(config.cache_capacity, Duration::from_secs(config.cache_ttl_secs));

        Ok(Self { config, client, cache })
    }

    pub fn cache(&self) -> &TtlCache<String, String> {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("geocoding cache cleared");
    }

    fn lookup(&self, lat: f64, lng: f64) -> Result<String, GeocodeError> {
        let url = format!("{}/reverse", self.config.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("accept-language", self.config.language.clone()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<NominatimReverse>())?;

        body.into_place_name()
    }
}

/// Cache key: the coordinate rounded to 6 decimals (~0.1 m).
pub fn cache_key(lat: f64, lng: f64) -> String {
    format!("{:.6},{:.6}", lat, lng)
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, GeocodeError> {
        let key = cache_key(lat, lng);
        if let Some(place_name) = self.cache.get(&key) {
            debug!(key = %key, "geocoding cache hit");
            return Ok(place_name);
        }

        match self.lookup(lat, lng) {
            Ok(place_name) => {
                info!(key = %key, place_name = %place_name, "geocoded");
                self.cache.insert(key, place_name.clone());
                Ok(place_name)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "reverse geocoding failed");
                Err(err)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NominatimReverse {
    display_name: Option<String>,
    error: Option<String>,
}

impl NominatimReverse {
    pub(crate) fn into_place_name(self) -> Result<String, GeocodeError> {
        if let Some(error) = self.error {
            debug!(error = %error, "nominatim returned no result");
            return Err(GeocodeError::NotFound);
        }
        self.display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(GeocodeError::NotFound)
    }
}
