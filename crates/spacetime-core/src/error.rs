use thiserror::Error;

/// Errors raised by grid construction, pair selection and grid state changes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("zoom must be between 0 and 21, got {0}")]
    InvalidZoom(u8),

    /// Latitude outside the open interval (-90, 90) or a non-finite
    /// longitude.
    #[error(
        "map center needs a latitude strictly between -90 and 90 and a finite \
         longitude, got {lat},{lng}"
    )]
    InvalidCenter { lat: f64, lng: f64 },

    #[error("pixel size must be between 1 and 640, got {0}")]
    InvalidPixelSize(u32),

    #[error("grid size must be at least 1, got {0}")]
    InvalidGridSize(usize),

    /// The distance threshold excluded every origin/destination pair.
    #[error("no origin/destination pairs within normalized distance {max_normalized_distance}")]
    EmptySelection { max_normalized_distance: f64 },

    #[error("route matrix is already attached to this grid")]
    RouteMatrixAlreadySet,
}

/// Why a point could not be resolved to a road location.
///
/// Always recovered by falling back to the raw point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapFailure {
    #[error("no route, street address or point of interest near {0}")]
    NoMatchingCandidate(String),

    #[error("reverse geocoding returned status {status} for {location}")]
    Status { status: String, location: String },

    #[error("reverse geocoding request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
