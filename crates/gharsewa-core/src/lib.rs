pub mod app_config;
pub mod config;
pub mod directory;
pub mod geo;
pub mod ranking;
pub mod seed;
pub mod store;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, load_nearby_default_limit};
pub use directory::{Candidate, RankedResult, Role};
pub use geo::{GeoPoint, EARTH_RADIUS_KM};
pub use ranking::{rank, RankOptions};
pub use seed::{load_directory_seed, DirectorySeed, SeedUser};
pub use store::{nearby, record_location, DirectoryStore, MemoryDirectory, MemoryStoreError};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("invalid role: {0}")]
    InvalidRole(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),
    #[error("seed validation failed: {0}")]
    Validation(String),
}
