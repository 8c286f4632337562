//! Snap-to-road via reverse geocoding.
//!
//! The Geocoding API describes a coordinate at many granularities (street,
//! neighbourhood, city, country...). Only the precise ones are useful for
//! routing. `street_address` alone leaves some points in lakes, so `route`
//! results are preferred.

use spacetime_core::{GeoPoint, SnapFailure, SnapResolution, SnapToRoad};

use crate::client::GmapsClient;
use crate::error::GmapsError;
use crate::types::{GeocodeResponse, GeocodeResult};

/// Accepted result types, most preferred first.
pub const SNAP_RESULT_TYPES: [&str; 3] = ["route", "street_address", "point_of_interest"];

/// Picks the first result of the most preferred type in [`SNAP_RESULT_TYPES`].
#[must_use]
pub fn select_resolution(results: &[GeocodeResult]) -> Option<SnapResolution> {
    SNAP_RESULT_TYPES.iter().find_map(|wanted| {
        results
            .iter()
            .find(|r| r.types.iter().any(|t| t == *wanted))
            .map(|r| SnapResolution {
                location: r.geometry.location,
                place_id: r.place_id.clone(),
                types: r.types.clone(),
            })
    })
}

impl GmapsClient {
    /// Calls the reverse geocoding endpoint for `point`.
    ///
    /// # Errors
    ///
    /// - [`GmapsError::Http`] on network failure.
    /// - [`GmapsError::ApiError`] on a non-2xx status.
    /// - [`GmapsError::Deserialize`] if the body is not a geocode response.
    pub async fn reverse_geocode(&self, point: GeoPoint) -> Result<GeocodeResponse, GmapsError> {
        let latlng = point.to_string();
        let url = self.maps_url("maps/api/geocode/json", &[("latlng", &latlng)]);
        self.get_json(&url, &format!("geocode(latlng={latlng})"))
            .await
    }

    /// Resolves `point` to a nearby road location.
    ///
    /// # Errors
    ///
    /// - [`SnapFailure::Request`] if the request itself fails.
    /// - [`SnapFailure::Status`] if the API status is not `OK`.
    /// - [`SnapFailure::NoMatchingCandidate`] if no result has an accepted type.
    pub async fn snap_to_road(&self, point: GeoPoint) -> Result<SnapResolution, SnapFailure> {
        let response = self
            .reverse_geocode(point)
            .await
            .map_err(|e| SnapFailure::Request(e.to_string()))?;

        if response.status != "OK" {
            if let Some(message) = &response.error_message {
                tracing::debug!(
                    %point,
                    status = %response.status,
                    message = %message,
                    "geocode error"
                );
            }
            return Err(SnapFailure::Status {
                status: response.status,
                location: point.to_string(),
            });
        }

        select_resolution(&response.results)
            .ok_or_else(|| SnapFailure::NoMatchingCandidate(point.to_string()))
    }
}

impl SnapToRoad for GmapsClient {
    async fn snap(&self, point: GeoPoint) -> Result<SnapResolution, SnapFailure> {
        self.snap_to_road(point).await
    }
}
