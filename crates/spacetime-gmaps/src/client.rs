//! HTTP client for the Google Maps Platform endpoints used by the grid
//! builder: reverse geocoding, static maps and route matrices.
//!
//! Wraps `reqwest` with the API key, base URLs and retry policy. The key is
//! passed in explicitly; nothing here reads the process environment.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::GmapsError;
use crate::retry::BackoffPolicy;

const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/";
const DEFAULT_ROUTES_BASE_URL: &str = "https://routes.googleapis.com/";

/// Client for the Maps and Routes APIs.
///
/// Use [`GmapsClient::new`] for production or [`GmapsClient::with_base_urls`]
/// to point at a mock server in tests.
pub struct GmapsClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) maps_base: Url,
    pub(crate) routes_base: Url,
    pub(crate) backoff: BackoffPolicy,
}

impl GmapsClient {
    /// Creates a client pointed at the production Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`GmapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        backoff: BackoffPolicy,
    ) -> Result<Self, GmapsError> {
        Self::with_base_urls(
            api_key,
            timeout_secs,
            backoff,
            DEFAULT_MAPS_BASE_URL,
            DEFAULT_ROUTES_BASE_URL,
        )
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GmapsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GmapsError::InvalidBaseUrl`] if either base URL does not parse.
    pub fn with_base_urls(
        api_key: &str,
        timeout_secs: u64,
        backoff: BackoffPolicy,
        maps_base: &str,
        routes_base: &str,
    ) -> Result<Self, GmapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("spacetime/0.1 (travel-time-grid)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            maps_base: parse_base_url(maps_base)?,
            routes_base: parse_base_url(routes_base)?,
            backoff,
        })
    }

    /// Builds a Maps URL with percent-encoded query parameters and the key.
    pub(crate) fn maps_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = join(&self.maps_base, path);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    pub(crate) fn routes_url(&self, path: &str) -> Url {
        join(&self.routes_base, path)
    }

    /// Sends a GET request and returns the response if its status is 2xx.
    ///
    /// # Errors
    ///
    /// - [`GmapsError::Http`] on network failure.
    /// - [`GmapsError::ApiError`] on a non-2xx status.
    pub(crate) async fn get(&self, url: &Url) -> Result<Response, GmapsError> {
        let response = self.client.get(url.clone()).send().await?;
        check_status(response).await
    }

    /// Sends a GET request and parses the body as JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, GmapsError> {
        let body = self.get(url).await?.text().await?;
        parse_json(&body, context)
    }
}

/// Turns a non-2xx response into [`GmapsError::ApiError`].
pub(crate) async fn check_status(response: Response) -> Result<Response, GmapsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GmapsError::ApiError {
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, GmapsError> {
    serde_json::from_str(body).map_err(|e| GmapsError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Normalise: ensure the base URL ends with exactly one slash so that joined
/// paths append to it rather than replacing its last segment.
fn parse_base_url(base_url: &str) -> Result<Url, GmapsError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GmapsError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path(), path.trim_start_matches('/'));
    url.set_path(&joined);
    url
}
