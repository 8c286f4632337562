use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub gmaps_api_key: Option<String>,
    pub log_level: String,
    /// Directory holding one sub-directory per exported grid.
    pub assets_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_delay_secs: u64,
    pub cost_confirm_threshold_dollars: f64,
    pub max_snap_drift: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "gmaps_api_key",
                &self.gmaps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("assets_dir", &self.assets_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("rate_limit_max_attempts", &self.rate_limit_max_attempts)
            .field("rate_limit_delay_secs", &self.rate_limit_delay_secs)
            .field(
                "cost_confirm_threshold_dollars",
                &self.cost_confirm_threshold_dollars,
            )
            .field("max_snap_drift", &self.max_snap_drift)
            .finish()
    }
}

impl AppConfig {
    /// The Maps API key, for commands that call the network.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `GMAPS_API_KEY` was not set.
    pub fn require_gmaps_api_key(&self) -> Result<&str, ConfigError> {
        self.gmaps_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GMAPS_API_KEY".to_string()))
    }
}
