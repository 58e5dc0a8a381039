use std::num::NonZeroUsize;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const NEARBY_DEFAULT_LIMIT_VAR: &str = "GHARSEWA_NEARBY_DEFAULT_LIMIT";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Resolve only the default `nearby` limit, without requiring `DATABASE_URL`.
///
/// Loads `.env` first, like [`load_app_config`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is not a positive integer.
pub fn load_nearby_default_limit() -> Result<NonZeroUsize, ConfigError> {
    dotenvy::dotenv().ok();
    parse_nearby_default_limit(|key| std::env::var(key))
}

fn parse_nearby_default_limit<F>(lookup: F) -> Result<NonZeroUsize, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: NEARBY_DEFAULT_LIMIT_VAR.to_string(),
        reason,
    };
    let raw = lookup(NEARBY_DEFAULT_LIMIT_VAR).unwrap_or_else(|_| "5".to_string());
    let limit = raw.parse::<usize>().map_err(|e| invalid(e.to_string()))?;
    NonZeroUsize::new(limit).ok_or_else(|| invalid("must be at least 1".to_string()))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the process environment,
/// so tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("GHARSEWA_ENV", "development"))?;

    let bind_addr = parse_addr("GHARSEWA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GHARSEWA_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("GHARSEWA_SEED_PATH", "./config/directory.yaml"));

    let db_max_connections = parse_u32("GHARSEWA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GHARSEWA_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("GHARSEWA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let nearby_default_limit = parse_nearby_default_limit(&lookup)?.get();
    let nearby_max_limit = parse_usize("GHARSEWA_NEARBY_MAX_LIMIT", "50")?;
    if nearby_max_limit < nearby_default_limit {
        return Err(invalid(
            "GHARSEWA_NEARBY_MAX_LIMIT",
            format!("must be >= GHARSEWA_NEARBY_DEFAULT_LIMIT ({nearby_default_limit})"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        seed_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        nearby_default_limit,
        nearby_max_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GHARSEWA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
