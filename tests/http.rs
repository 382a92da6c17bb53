#![allow(missing_docs)]


use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use nearby_transit::router;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;
use transit::Error;

use self::provider::{MockProvider, arrival, place, stop};

fn app(transit: &MockProvider, geocoder: &MockProvider) -> Router {
    router(Arc::new(transit.clone()), Arc::new(geocoder.clone()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&body).expect("json body"))
}

fn seattle_stops() -> MockProvider {
    // 800 m, 50 m and 300 m due north of the query point
    MockProvider::with_stops(vec![
        stop("1_800", 47.613395, -122.3321),
        stop("1_50", 47.60665, -122.3321),
        stop("1_300", 47.608898, -122.3321),
    ])
}

#[tokio::test]
async fn stops_nearest_first() {
    let transit = seattle_stops();
    let (status, body) =
        get(app(&transit, &MockProvider::default()), "/api/stops?lat=47.6062&lng=-122.3321").await;

    assert_eq!(status, StatusCode::OK);
    let stops = body["stops"].as_array().expect("stops");
    let ids = stops.iter().map(|s| s["id"].as_str().expect("id")).collect::<Vec<_>>();
    assert_eq!(ids, ["1_50", "1_300", "1_800"]);

    let distance = stops[0]["distance"].as_f64().expect("distance");
    assert!((45.0..55.0).contains(&distance), "{distance}");
    assert_eq!(stops[0]["coordinates"], json!({"lat": 47.60665, "lng": -122.3321}));
    assert_eq!(stops[0]["direction"], "N");
    assert!(stops[0].get("code").is_none());

    assert_eq!(transit.requests(), ["stops 47.6062,-122.3321 500 50"]);
}

#[tokio::test]
async fn stops_limit() {
    let uri = "/api/stops?lat=47.6062&lng=-122.3321&limit=1";
    let (status, body) = get(app(&seattle_stops(), &MockProvider::default()), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["stops"][0]["id"], "1_50");
}

#[tokio::test]
async fn stops_bad_coordinates() {
    let transit = seattle_stops();

    for uri in [
        "/api/stops?lat=47.6062",
        "/api/stops?lat=&lng=-122.3321",
        "/api/stops?lat=north&lng=-122.3321",
        "/api/stops?lat=95&lng=-122.3321",
        "/api/stops?lat=47.6062&lng=-122.3321&limit=0",
    ] {
        let (status, body) = get(app(&transit, &MockProvider::default()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["stops"], json!([]), "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }

    assert!(transit.requests().is_empty());
}

// Upstream failures surface as errors, never as an empty success.
#[tokio::test]
async fn stops_upstream_failure() {
    let transit = MockProvider::failing(Error::UpstreamUnavailable {
        status: Some(503),
        message: "OneBusAway API error: 503 Service Unavailable".to_string(),
    });
    let (status, body) =
        get(app(&transit, &MockProvider::default()), "/api/stops?lat=47.6062&lng=-122.3321").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stops"], json!([]));
    assert!(body["error"].as_str().expect("error").contains("503"));
}

#[tokio::test]
async fn stops_upstream_timeout() {
    let transit = MockProvider::failing(Error::UpstreamTimeout("no answer".to_string()));
    let (status, _) =
        get(app(&transit, &MockProvider::default()), "/api/stops?lat=47.6062&lng=-122.3321").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

fn upcoming() -> MockProvider {
    let now = Utc::now().timestamp_millis();
    MockProvider::with_arrivals(vec![
        arrival("40", None, now + 3_700_000),
        arrival("8", None, now + 125_000),
        arrival("49", Some(0), now + 3_500_000),
        arrival("62", Some(now - 5_000), now - 60_000),
    ])
}

fn routes(body: &Value) -> Vec<&str> {
    body["arrivals"]
        .as_array()
        .expect("arrivals")
        .iter()
        .map(|a| a["routeShortName"].as_str().expect("route"))
        .collect()
}

#[tokio::test]
async fn arrivals_sorted() {
    let transit = upcoming();
    let (status, body) =
        get(app(&transit, &MockProvider::default()), "/api/arrivals?stopId=1_575").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(routes(&body), ["62", "8", "49", "40"]);

    let first = &body["arrivals"][0];
    assert_eq!(first["status"], "predicted");
    assert_eq!(first["minutesUntilArrival"], 0);

    let second = &body["arrivals"][1];
    assert_eq!(second["status"], "scheduled");
    assert_eq!(second["minutesUntilArrival"], 2);
    assert!(second.get("predictedArrivalTime").is_none());

    assert_eq!(transit.requests(), ["arrivals 1_575"]);
}

#[tokio::test]
async fn arrivals_next_hour() {
    let uri = "/api/arrivals?stopId=1_575&filterNextHour=true";
    let (status, body) = get(app(&upcoming(), &MockProvider::default()), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(routes(&body), ["62", "8", "49"]);

    let uri = "/api/arrivals?stopId=1_575&filterNextHour=true&limit=2";
    let (_, body) = get(app(&upcoming(), &MockProvider::default()), uri).await;
    assert_eq!(routes(&body), ["62", "8"]);

    let uri = "/api/arrivals?stopId=1_575&filterNextHour=false&limit=10";
    let (_, body) = get(app(&upcoming(), &MockProvider::default()), uri).await;
    assert_eq!(routes(&body).len(), 4);
}

#[tokio::test]
async fn arrivals_bad_request() {
    let transit = upcoming();

    for uri in ["/api/arrivals", "/api/arrivals?stopId=%20", "/api/arrivals?stopId=1_575&limit=0"] {
        let (status, body) = get(app(&transit, &MockProvider::default()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["arrivals"], json!([]), "{uri}");
    }

    assert!(transit.requests().is_empty());
}

#[tokio::test]
async fn arrivals_upstream_failure() {
    let transit = MockProvider::failing(Error::UpstreamUnavailable {
        status: Some(404),
        message: "OneBusAway API returned error code: 404".to_string(),
    });
    let (status, body) =
        get(app(&transit, &MockProvider::default()), "/api/arrivals?stopId=1_575").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["arrivals"], json!([]));
}

#[tokio::test]
async fn location_suggestions() {
    let geocoder = MockProvider::with_places(vec![
        place("Space Needle, Seattle", 47.6205, -122.3493),
        place("Space Needle Parking, Seattle", 47.6211, -122.348),
    ]);
    let (status, body) =
        get(app(&MockProvider::default(), &geocoder), "/api/location?q=space%20needle").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"suggestions": [
            {"place_name": "Space Needle, Seattle", "center": [-122.3493, 47.6205]},
            {"place_name": "Space Needle Parking, Seattle", "center": [-122.348, 47.6211]},
        ]})
    );
    assert_eq!(geocoder.requests(), ["geocode space needle 5"]);
}

#[tokio::test]
async fn location_errors() {
    let none = MockProvider::default();
    let (status, body) = get(app(&none, &none), "/api/location").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["suggestions"], json!([]));

    let geocoder = MockProvider::failing(Error::Geocoding("API error: 401".to_string()));
    let (status, body) = get(app(&none, &geocoder), "/api/location?q=Seattle").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["suggestions"], json!([]));
    assert!(body["error"].as_str().expect("error").contains("401"));
}

#[tokio::test]
async fn reverse_location() {
    let uri = "/api/location/reverse?lat=47.6205&lng=-122.3493";

    let geocoder = MockProvider::with_place_name("400 Broad St, Seattle, Washington 98109");
    let (status, body) = get(app(&MockProvider::default(), &geocoder), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"place_name": "400 Broad St, Seattle, Washington 98109"}));
    assert_eq!(geocoder.requests(), ["reverse 47.6205,-122.3493"]);

    let (_, body) = get(app(&MockProvider::default(), &MockProvider::default()), uri).await;
    assert_eq!(body, json!({"place_name": "Unknown location"}));
}

#[tokio::test]
async fn reverse_bad_coordinates() {
    let uri = "/api/location/reverse?lat=47.6205";
    let (status, body) = get(app(&MockProvider::default(), &MockProvider::default()), uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let keys = body.as_object().expect("object").keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys, ["error"]);
}
