use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let gmaps_api_key = lookup("GMAPS_API_KEY").ok().filter(|k| !k.trim().is_empty());
    let log_level = or_default("SPACETIME_LOG_LEVEL", "info");
    let assets_dir = PathBuf::from(or_default("SPACETIME_ASSETS_DIR", "./frontend/src/assets"));

    let request_timeout_secs = parse_u64("SPACETIME_REQUEST_TIMEOUT_SECS", "30")?;
    let rate_limit_max_attempts = parse_u32("SPACETIME_RATE_LIMIT_MAX_ATTEMPTS", "3")?;
    let rate_limit_delay_secs = parse_u64("SPACETIME_RATE_LIMIT_DELAY_SECS", "30")?;
    let cost_confirm_threshold_dollars =
        parse_f64("SPACETIME_COST_CONFIRM_THRESHOLD_DOLLARS", "1.0")?;
    let max_snap_drift = parse_f64("SPACETIME_MAX_SNAP_DRIFT", "0.05")?;

    if rate_limit_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SPACETIME_RATE_LIMIT_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    for (var, value) in [
        ("SPACETIME_COST_CONFIRM_THRESHOLD_DOLLARS", cost_confirm_threshold_dollars),
        ("SPACETIME_MAX_SNAP_DRIFT", max_snap_drift),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
    }

    Ok(AppConfig {
        gmaps_api_key,
        log_level,
        assets_dir,
        request_timeout_secs,
        rate_limit_max_attempts,
        rate_limit_delay_secs,
        cost_confirm_threshold_dollars,
        max_snap_drift,
    })
}

/// Parse `raw`, reporting `var` as the culprit on failure.
fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}
