use spacetime_core::CoreError;
use thiserror::Error;

/// Errors returned by the Google Maps client.
#[derive(Debug, Error)]
pub enum GmapsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("Maps API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// Every attempt allowed by the backoff policy was rate limited.
    #[error("rate limit exceeded after {attempts} attempts (last HTTP {status})")]
    RateLimitExceeded { attempts: u32, status: u16 },

    /// The cost confirmation was declined.
    #[error("aborted by user: {pairs} routes would cost about ${dollars:.2}")]
    UserAborted { pairs: usize, dollars: f64 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The pair selection indexes past the supplied origins or destinations.
    #[error(
        "selection covers {selection_origins}x{selection_destinations} pairs \
         but only {origins} origins and {destinations} destinations were given"
    )]
    SelectionMismatch {
        selection_origins: usize,
        selection_destinations: usize,
        origins: usize,
        destinations: usize,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl GmapsError {
    /// HTTP status carried by an [`GmapsError::ApiError`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            GmapsError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
