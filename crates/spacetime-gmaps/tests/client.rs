//! Integration tests for `GmapsClient` using wiremock HTTP mocks.

use std::collections::HashSet;
use std::time::Duration;

use serde_json::{json, Value};
use spacetime_core::{GeoPoint, MapView, PairSelection, RouteCondition, SnapFailure, TravelMode};
use spacetime_gmaps::{BackoffPolicy, CostGate, GmapsClient, GmapsError, RouteMatrixRequest};
use wiremock::matchers::{body_partial_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const MATRIX_PATH: &str = "/distanceMatrix/v2:computeRouteMatrix";

fn test_client(base_url: &str) -> GmapsClient {
    GmapsClient::with_base_urls(
        "test-key",
        30,
        BackoffPolicy::fixed(3, Duration::ZERO),
        base_url,
        base_url,
    )
    .expect("client construction should not fail")
}

fn line_of_points(n: usize) -> Vec<GeoPoint> {
    (0..n)
        .map(|i| GeoPoint::new(47.6, -122.3 + i as f64 * 0.001))
        .collect()
}

fn accept(_: &str) -> bool {
    true
}

/// Answers a route matrix request with one element per origin/destination
/// pair, duration `100 * origin + destination` seconds.
struct EchoMatrix;

impl Respond for EchoMatrix {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("json request body");
        let n_origins = body["origins"].as_array().map_or(0, Vec::len);
        let n_destinations = body["destinations"].as_array().map_or(0, Vec::len);
        let elements: Vec<Value> = (0..n_origins)
            .flat_map(|o| {
                (0..n_destinations).map(move |d| {
                    json!({
                        "originIndex": o,
                        "destinationIndex": d,
                        "status": {},
                        "distanceMeters": 1000,
                        "duration": format!("{}s", 100 * o + d),
                        "condition": "ROUTE_EXISTS"
                    })
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(elements)
    }
}

// ---------------------------------------------------------------------------
// Snapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snap_picks_route_result() {
    let server = MockServer::start().await;

    let body = json!({
        "status": "OK",
        "results": [
            {
                "geometry": { "location": { "lat": 47.61, "lng": -122.31 } },
                "place_id": "addr",
                "types": ["street_address"]
            },
            {
                "geometry": { "location": { "lat": 47.62, "lng": -122.32 } },
                "place_id": "road",
                "types": ["route"]
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("latlng", "47.6,-122.3"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resolution = client
        .snap_to_road(GeoPoint::new(47.6, -122.3))
        .await
        .expect("should snap");

    assert_eq!(resolution.place_id, "road");
    assert_eq!(resolution.location, GeoPoint::new(47.62, -122.32));
    assert_eq!(resolution.types, vec!["route".to_owned()]);
}

#[tokio::test]
async fn snap_reports_non_ok_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .snap_to_road(GeoPoint::new(0.0, 0.0))
        .await
        .expect_err("should fail");

    assert!(
        matches!(&err, SnapFailure::Status { status, .. } if status == "ZERO_RESULTS"),
        "expected Status failure, got: {err:?}"
    );
}

#[tokio::test]
async fn snap_reports_unmatched_types() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                "place_id": "city",
                "types": ["locality", "political"]
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .snap_to_road(GeoPoint::new(1.0, 2.0))
        .await
        .expect_err("should fail");

    assert!(matches!(err, SnapFailure::NoMatchingCandidate(_)));
}

#[tokio::test]
async fn snap_http_error_becomes_request_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .snap_to_road(GeoPoint::new(1.0, 2.0))
        .await
        .expect_err("should fail");

    assert!(matches!(err, SnapFailure::Request(msg) if msg.contains("403")));
}

// ---------------------------------------------------------------------------
// Static map
// ---------------------------------------------------------------------------

#[tokio::test]
async fn static_map_returns_image_bytes() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a];

    Mock::given(method("GET"))
        .and(path("/maps/api/staticmap"))
        .and(query_param("center", "47.6,-122.3"))
        .and(query_param("zoom", "14"))
        .and(query_param("size", "640x640"))
        .and(query_param("scale", "2"))
        .and(query_param("style", "feature:poi|visibility:off"))
        .and(query_param("markers", "|47.6,-122.3|47.7,-122.4"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let view = MapView::new(GeoPoint::new(47.6, -122.3), 14, 640).expect("valid view");
    let markers = [GeoPoint::new(47.6, -122.3), GeoPoint::new(47.7, -122.4)];
    let bytes = client
        .static_map(&view, &markers)
        .await
        .expect("should fetch map");

    assert_eq!(bytes, png);
}

#[tokio::test]
async fn static_map_http_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/staticmap"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad size"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let view = MapView::new(GeoPoint::new(0.0, 0.0), 3, 400).expect("valid view");
    let err = client.static_map(&view, &[]).await.expect_err("should fail");

    assert!(
        matches!(err, GmapsError::ApiError { status: 400, ref body } if body == "bad size"),
        "expected ApiError 400, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Route matrix
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dense_thirty_by_thirty_takes_four_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(headers(
            "X-Goog-FieldMask",
            vec![
                "originIndex",
                "destinationIndex",
                "duration",
                "distanceMeters",
                "status",
                "condition",
            ],
        ))
        .respond_with(EchoMatrix)
        .expect(4)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(30);
    let selection = PairSelection::all(30, 30);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let mut fetch = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cost accepted");
    assert_eq!(fetch.total_batches(), 4);

    let mut entries = Vec::new();
    while let Some(batch) = fetch.next_batch().await {
        entries.extend(batch.expect("batch should succeed"));
    }
    assert_eq!(fetch.remaining_batches(), 0);
    assert!(fetch.next_batch().await.is_none(), "cursor must stay exhausted");

    assert_eq!(entries.len(), 900);
    let unique: HashSet<(usize, usize)> = entries
        .iter()
        .map(|e| (e.origin_index, e.destination_index))
        .collect();
    assert_eq!(unique.len(), 900);
    assert!(entries
        .iter()
        .all(|e| e.origin_index < 30 && e.destination_index < 30));
}

#[tokio::test]
async fn sparse_fetch_maps_indices_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(EchoMatrix)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(4);
    let view = MapView::new(GeoPoint::new(47.6, -122.3), 10, 400).expect("valid view");
    let selection =
        spacetime_core::select_pairs(&view, &points, &points, 10.0).expect("non-empty selection");
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Walk,
        departure_time: None,
    };

    let entries = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch")
        .try_collect()
        .await
        .expect("fetch should succeed");

    let mut pairs: Vec<_> = entries
        .iter()
        .map(|e| (e.origin_index, e.destination_index))
        .collect();
    pairs.sort_unstable();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);

    // Every 1 x k request answers with origin 0 locally; the duration proves
    // the destination was remapped rather than the request being dense.
    let origin_two = entries
        .iter()
        .find(|e| e.origin_index == 2)
        .expect("origin 2 queried");
    assert_eq!(origin_two.destination_index, 3);
    assert_eq!(origin_two.duration_seconds, Some(0));
    assert_eq!(origin_two.condition, RouteCondition::RouteExists);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3, "one request per origin with selected pairs");
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(EchoMatrix)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(2);
    let selection = PairSelection::all(2, 2);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let entries = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch")
        .try_collect()
        .await
        .expect("retry should succeed");

    assert_eq!(entries.len(), 4);
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn persistent_rate_limit_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(2);
    let selection = PairSelection::all(2, 2);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let mut fetch = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch");
    let err = fetch
        .next_batch()
        .await
        .expect("one batch")
        .expect_err("should give up");

    assert!(
        matches!(err, GmapsError::RateLimitExceeded { attempts: 3, status: 429 }),
        "expected RateLimitExceeded, got: {err:?}"
    );
    assert!(fetch.next_batch().await.is_none(), "cursor is fused after an error");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(2);
    let selection = PairSelection::all(2, 2);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let err = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch")
        .try_collect()
        .await
        .expect_err("should fail");

    assert!(
        matches!(err, GmapsError::ApiError { status: 500, .. }),
        "expected ApiError 500, got: {err:?}"
    );
}

#[tokio::test]
async fn declined_cost_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .respond_with(EchoMatrix)
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(30);
    let selection = PairSelection::all(30, 30);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let result = client.fetch_route_matrix(request, &CostGate::default(), &|_: &str| false);

    assert!(matches!(
        result,
        Err(GmapsError::UserAborted { pairs: 900, .. })
    ));
}

#[tokio::test]
async fn transit_payload_carries_departure_time() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .and(body_partial_json(json!({
            "travelMode": "TRANSIT",
            "departureTime": "2024-05-06T08:00:00Z"
        })))
        .respond_with(EchoMatrix)
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = line_of_points(3);
    let selection = PairSelection::all(3, 3);
    let departure = "2024-05-06T08:00:00Z"
        .parse::<chrono::DateTime<chrono::Utc>>()
        .expect("valid timestamp");
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Transit,
        departure_time: Some(departure),
    };

    let entries = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch")
        .try_collect()
        .await
        .expect("fetch should succeed");

    assert_eq!(entries.len(), 9);
}

#[tokio::test]
async fn drive_payload_is_traffic_unaware() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MATRIX_PATH))
        .and(body_partial_json(json!({
            "travelMode": "DRIVE",
            "routingPreference": "TRAFFIC_UNAWARE",
            "origins": [{ "waypoint": { "location": { "latLng": {
                "latitude": 47.6, "longitude": -122.3
            } } } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "destinationIndex": 0, "condition": "ROUTE_NOT_FOUND", "status": {} }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let points = vec![GeoPoint::new(47.6, -122.3)];
    let destinations = vec![GeoPoint::new(47.7, -122.4)];
    let selection = PairSelection::all(1, 1);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &destinations,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let entries = client
        .fetch_route_matrix(request, &CostGate::default(), &accept)
        .expect("cheap fetch")
        .try_collect()
        .await
        .expect("fetch should succeed");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].condition, RouteCondition::RouteNotFound);
    assert_eq!(entries[0].usable_duration(), None);
}

#[tokio::test]
async fn oversized_selection_is_rejected() {
    let client = test_client("http://localhost:1");
    let points = line_of_points(2);
    let selection = PairSelection::all(3, 3);
    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: TravelMode::Drive,
        departure_time: None,
    };

    let result = client.fetch_route_matrix(request, &CostGate::default(), &accept);
    assert!(matches!(result, Err(GmapsError::SelectionMismatch { .. })));
}
