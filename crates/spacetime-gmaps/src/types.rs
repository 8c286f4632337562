//! Wire types for the Geocoding and Routes APIs.

use serde::{Deserialize, Serialize};
use spacetime_core::{GeoPoint, TravelMode};

// ---------------------------------------------------------------------------
// Reverse geocoding
// ---------------------------------------------------------------------------

/// Envelope of a `geocode/json` response. `status` is `"OK"` on success.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    pub place_id: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: GeoPoint,
}

// ---------------------------------------------------------------------------
// computeRouteMatrix
// ---------------------------------------------------------------------------

/// Request body for `distanceMatrix/v2:computeRouteMatrix`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatrixPayload {
    pub origins: Vec<RouteMatrixWaypoint>,
    pub destinations: Vec<RouteMatrixWaypoint>,
    pub travel_mode: TravelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_preference: Option<&'static str>,
    /// RFC 3339 UTC timestamp, e.g. `2024-05-06T08:00:00Z`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteMatrixWaypoint {
    pub waypoint: Waypoint,
}

#[derive(Debug, Serialize)]
pub struct Waypoint {
    pub location: WaypointLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointLocation {
    pub lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for RouteMatrixWaypoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            waypoint: Waypoint {
                location: WaypointLocation {
                    lat_lng: LatLng {
                        latitude: point.lat,
                        longitude: point.lng,
                    },
                },
            },
        }
    }
}
