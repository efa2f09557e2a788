use anyhow::{Context, Result};
use serde::Deserialize;

use crate::geodesy::LatLng;

/// Which persistence medium holds the beacon list.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    #[serde(default = "default_store_key")]
    pub store_key: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    #[serde(default = "default_geocoder_timeout_ms")]
    pub geocoder_timeout_ms: u64,
    #[serde(default = "default_lat")]
    pub default_lat: f64,
    #[serde(default = "default_lng")]
    pub default_lng: f64,
    #[serde(default = "default_api_addr")]
    pub api_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_sim_beacons")]
    pub sim_beacons: usize,
    #[serde(default)]
    pub sim_seed: Option<u64>,
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::File
}

fn default_store_path() -> String {
    "./data".to_string()
}

fn default_store_key() -> String {
    "orientatrainer-beacons".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_geocoder_timeout_ms() -> u64 {
    5000
}

// Madrid
fn default_lat() -> f64 {
    40.4168
}

fn default_lng() -> f64 {
    -3.7038
}

fn default_api_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sim_beacons() -> usize {
    12
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_backend: default_store_backend(),
            store_path: default_store_path(),
            store_key: default_store_key(),
            redis_url: default_redis_url(),
            geocoder_url: default_geocoder_url(),
            geocoder_timeout_ms: default_geocoder_timeout_ms(),
            default_lat: default_lat(),
            default_lng: default_lng(),
            api_addr: default_api_addr(),
            log_level: default_log_level(),
            sim_beacons: default_sim_beacons(),
            sim_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        // Parse environment variables into the Config struct
        envy::from_env().context("Failed to load config from environment")
    }

    /// Origin used when no place name resolves.
    pub fn default_origin(&self) -> LatLng {
        LatLng::new(self.default_lat, self.default_lng)
    }

    pub fn geocoder_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.geocoder_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_yields_defaults() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.store_backend, StoreBackend::File);
        assert_eq!(config.store_key, "orientatrainer-beacons");
        assert_eq!(config.geocoder_timeout_ms, 5000);
        assert_eq!(config.default_origin(), LatLng::new(40.4168, -3.7038));
        assert!(config.sim_seed.is_none());
    }

    #[test]
    fn backend_and_seed_parse_from_strings() {
        let vars = vec![
            ("STORE_BACKEND".to_string(), "redis".to_string()),
            ("SIM_SEED".to_string(), "42".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.sim_seed, Some(42));
    }
}
