//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use climate_projections::{
    api::create_router,
    engine::{NoisePolicy, ProjectionEngine},
    AppState, ClimateService,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::new(test_service()))
}

fn test_service() -> ClimateService {
    ClimateService::new(
        ProjectionEngine::default(),
        NoisePolicy::Disabled,
        Duration::from_millis(20),
    )
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Projection Endpoint Tests ==

#[tokio::test]
async fn test_projection_pending_without_wait() {
    let (status, json) = send(create_test_app(), "GET", "/projections").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
    assert!(json["value"].is_null());
    assert!(json["key"].as_str().unwrap().starts_with("[\"predictions\""));
}

#[tokio::test]
async fn test_projection_settles_with_wait() {
    let (status, json) = send(
        create_test_app(),
        "GET",
        "/projections?model=nasa&scenario=rcp8.5&confidence=90&wait=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert!(json["settledAt"].is_string());

    let points = json["value"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 76);
    assert_eq!(points[0]["year"], 2024);
    assert_eq!(points[75]["year"], 2099);

    for point in points {
        let predicted = point["predicted"].as_f64().unwrap();
        assert!(point["lowerBound"].as_f64().unwrap() <= predicted);
        assert!(predicted <= point["upperBound"].as_f64().unwrap());
        assert!(point["secondaryMetrics"]["precipitation"].is_number());
        assert!(point["secondaryMetrics"]["sealevel"].is_number());
    }
}

#[tokio::test]
async fn test_projection_time_range_sets_length() {
    let (_, json) = send(
        create_test_app(),
        "GET",
        "/projections?time_range=10y&region=europe&wait=true",
    )
    .await;

    assert_eq!(json["value"]["points"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_projection_invalid_model() {
    let (status, json) = send(create_test_app(), "GET", "/projections?model=foo").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("foo"));
}

#[tokio::test]
async fn test_projection_off_grid_confidence() {
    let (status, _) = send(create_test_app(), "GET", "/projections?confidence=99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let app = create_test_app();

    let (a, b, c) = tokio::join!(
        send(app.clone(), "GET", "/projections?category=sealevel&wait=true"),
        send(app.clone(), "GET", "/projections?category=sealevel&wait=true"),
        send(app.clone(), "GET", "/projections?category=sealevel&wait=true"),
    );
    assert_eq!(a.1["value"], b.1["value"]);
    assert_eq!(b.1["value"], c.1["value"]);

    let (_, stats) = send(app, "GET", "/stats").await;
    assert_eq!(stats["projections"]["fetches"], 1);
    assert_eq!(stats["projections"]["total_entries"], 1);
}

#[tokio::test]
async fn test_invalidate_projection_forces_refetch() {
    let app = create_test_app();
    let uri = "/projections?scenario=rcp2.6&wait=true";

    send(app.clone(), "GET", uri).await;
    let (status, json) = send(app.clone(), "DELETE", "/projections?scenario=rcp2.6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    let (_, json) = send(app.clone(), "GET", uri).await;
    assert_eq!(json["status"], "success");

    let (_, stats) = send(app, "GET", "/stats").await;
    assert_eq!(stats["projections"]["fetches"], 2);
    assert_eq!(stats["projections"]["invalidations"], 1);
}

// == History and Global Stats Endpoint Tests ==

#[tokio::test]
async fn test_history_endpoint() {
    let (status, json) = send(
        create_test_app(),
        "GET",
        "/history?region=asia&time_range=1y&wait=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let records = json["value"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 12);
    assert_eq!(records[0]["date"], "Jan 2023");
}

#[tokio::test]
async fn test_history_invalid_region() {
    let (status, _) = send(create_test_app(), "GET", "/history?region=mars").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_global_stats_endpoint() {
    let (status, json) = send(create_test_app(), "GET", "/global-stats?wait=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "[\"globalStats\"]");
    assert_eq!(json["value"]["co2Level"], 417);
}

// == Maintenance Endpoint Tests ==

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let app = create_test_app();
    send(app.clone(), "GET", "/projections?wait=true").await;
    send(app.clone(), "GET", "/global-stats?wait=true").await;

    let (status, json) = send(app.clone(), "DELETE", "/cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (_, stats) = send(app, "GET", "/stats").await;
    assert_eq!(stats["total"]["total_entries"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = send(create_test_app(), "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
