use thiserror::Error;

// Custom Result type alias for convenient use across the project
pub type Result<T> = std::result::Result<T, BeaconError>;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No beacons available within {radius_m} m of the origin")]
    NoCandidates { radius_m: f64 },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Geocoder error: {0}")]
    Geocoder(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BeaconError {
    /// Short machine-readable tag, used by the HTTP surface.
    pub fn kind(&self) -> &'static str {
        match self {
            BeaconError::Validation(_) => "validation",
            BeaconError::NoCandidates { .. } => "no_candidates",
            BeaconError::Storage(_) | BeaconError::Redis(_) | BeaconError::Serialization(_) => {
                "storage"
            }
            BeaconError::Geocoder(_) => "network",
            BeaconError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for BeaconError {
    fn from(err: reqwest::Error) -> Self {
        BeaconError::Geocoder(err.to_string())
    }
}
