//! Router tests against the in-memory store and a canned weather feed.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, feed_doc, get, post, put, StubFeed};
use serde_json::json;

use heatwatch::Config;

fn one_observation() -> StubFeed {
    StubFeed(Some(feed_doc(&[("20250711143000", 25.0, 50.0)])))
}

// ---------------------------------------------------------------------------
// External ingestion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_external_stores_once() {
    let (app, store) = build_test_app(one_observation(), Config::default());

    let first = post(app.clone(), "/ingest/external", None).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let json = body_json(first).await;
    assert_eq!(json["message"], "New external data ingested");
    assert_eq!(json["timestamp"], "2025-07-11T14:30:00");
    assert_eq!(json["apparent"], 26.2);

    let second = post(app, "/ingest/external", None).await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let json = body_json(second).await;
    assert_eq!(json["message"], "Data already exists (not stored)");

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn ingest_external_rejects_malformed_feed() {
    let feed = StubFeed(Some(json!({ "observations": { "header": [] } })));
    let (app, store) = build_test_app(feed, Config::default());

    let response = post(app, "/ingest/external", None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_DATA_FORMAT");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn ingest_external_rejects_impossible_humidity() {
    let feed = StubFeed(Some(feed_doc(&[("20250101000000", 25.0, 140.0)])));
    let (app, store) = build_test_app(feed, Config::default());

    let response = post(app, "/ingest/external", None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_DATA_FORMAT");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn ingest_external_reports_unreachable_feed() {
    let (app, store) = build_test_app(StubFeed(None), Config::default());

    let response = post(app, "/ingest/external", None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_UNAVAILABLE");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch BOM data"));

    assert!(store.is_empty().await);
}

// ---------------------------------------------------------------------------
// Internal ingestion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_internal_requires_a_body() {
    let (app, store) = build_test_app(one_observation(), Config::default());

    for body in [None, Some(""), Some("not json"), Some("null")] {
        let response = post(app.clone(), "/ingest/internal", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing JSON data");
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn ingest_internal_rejects_bad_fields() {
    let (app, store) = build_test_app(one_observation(), Config::default());

    let bodies = [
        r#"{"temperature": 22.5}"#,
        r#"{"temperature": "warm", "humidity": 50}"#,
        r#"{"temperature": 22.5, "humidity": 140}"#,
    ];
    for body in bodies {
        let response = post(app.clone(), "/ingest/internal", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid or missing fields");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn ingest_internal_stores_reading() {
    let (app, store) = build_test_app(one_observation(), Config::default());

    let response = post(
        app.clone(),
        "/ingest/internal",
        Some(r#"{"temperature": 25, "humidity": "50"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Internal data ingested successfully");
    assert_eq!(json["apparent"], 26.2);

    let response = get(app, "/readings/internal/latest").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["source"], "internal");
    assert_eq!(json["temperature"], 25.0);

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn simulate_internal_adds_reading() {
    let (app, store) = build_test_app(one_observation(), Config::default());

    let response = post(app, "/simulate/internal", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Simulated internal data added");

    let temperature = json["temperature"].as_f64().unwrap();
    assert!((15.0..=40.0).contains(&temperature));
    assert_eq!(store.len().await, 1);
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_reading_is_404_before_first_report() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let response = get(app.clone(), "/readings/external/latest").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = get(app, "/readings/outdoors/latest").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn temperature_log_rejects_bad_limit_as_json() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let response = get(app, "/temperature-log?limit=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn temperature_log_lists_both_sources_newest_first() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    post(app.clone(), "/ingest/external", None).await;
    for temp in [21, 22, 23] {
        let body = format!(r#"{{"temperature": {temp}, "humidity": 40}}"#);
        let response = post(app.clone(), "/ingest/internal", Some(&body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get(app.clone(), "/temperature-log").await).await;
    assert_eq!(json["external"].as_array().unwrap().len(), 1);
    let internal = json["internal"].as_array().unwrap();
    assert_eq!(internal.len(), 3);
    assert_eq!(internal[0]["temperature"], 23.0);

    let json = body_json(get(app, "/temperature-log?limit=2").await).await;
    assert_eq!(json["internal"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn thresholds_default_set() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let response = get(app, "/thresholds").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ranges"].as_array().unwrap().len(), 4);
    assert_eq!(json["safe_threshold"], 26.0);
}

#[tokio::test]
async fn thresholds_replace_valid_set() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let body = json!({ "ranges": [
        { "from": 30, "to": 35, "label": "High Risk" },
        { "from": 16, "to": "24", "label": "Safe" },
        { "from": 24, "to": 30, "label": "Moderate Risk" },
        { "from": 35, "to": 60, "label": "Very High Risk" },
    ] })
    .to_string();

    let response = put(app.clone(), "/thresholds", &body, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["safe_threshold"], 24.0);
    assert_eq!(json["ranges"][0]["label"], "Safe");

    let json = body_json(get(app, "/thresholds").await).await;
    assert_eq!(json["safe_threshold"], 24.0);
}

#[tokio::test]
async fn thresholds_invalid_set_leaves_previous_in_place() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let gap = json!({ "ranges": [
        { "from": 18, "to": 26, "label": "Safe" },
        { "from": 27, "to": 30, "label": "Moderate Risk" },
        { "from": 30, "to": 35, "label": "High Risk" },
        { "from": 35, "to": 100, "label": "Very High Risk" },
    ] })
    .to_string();
    let too_few = json!({ "ranges": [{ "from": 18, "to": 26, "label": "Safe" }] }).to_string();

    for body in [gap.as_str(), too_few.as_str(), "{}", "garbage"] {
        let response = put(app.clone(), "/thresholds", body, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let json = body_json(get(app, "/thresholds").await).await;
    assert_eq!(json["safe_threshold"], 26.0);
    assert_eq!(json["ranges"][1]["from"], 26.0);
}

#[tokio::test]
async fn thresholds_update_requires_token_when_configured() {
    let config = Config {
        admin_token: Some("s3cret".into()),
        ..Config::default()
    };
    let (app, _) = build_test_app(one_observation(), config);

    let body = json!([
        { "from": 18, "to": 25, "label": "Safe" },
        { "from": 25, "to": 30, "label": "Moderate Risk" },
        { "from": 30, "to": 35, "label": "High Risk" },
        { "from": 35, "to": 100, "label": "Very High Risk" },
    ])
    .to_string();

    let response = put(app.clone(), "/thresholds", &body, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = put(app.clone(), "/thresholds", &body, Some("wrong")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = put(app, "/thresholds", &body, Some("s3cret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["safe_threshold"], 25.0);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_without_readings_has_no_alert() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let json = body_json(get(app, "/dashboard").await).await;
    assert!(json["internal"].is_null());
    assert!(json["external"].is_null());
    assert_eq!(json["safe_threshold"], 26.0);
    assert_eq!(json["alert"]["state"], "no_alert");
    assert_eq!(
        json["alert"]["message"],
        "No critical warning or alert at this point."
    );
}

#[tokio::test]
async fn dashboard_alert_prefers_internal() {
    let feed = StubFeed(Some(feed_doc(&[("20250711143000", 35.0, 50.0)])));
    let (app, _) = build_test_app(feed, Config::default());

    post(app.clone(), "/ingest/external", None).await;
    post(
        app.clone(),
        "/ingest/internal",
        Some(r#"{"temperature": 20, "humidity": 50}"#),
    )
    .await;

    let json = body_json(get(app.clone(), "/dashboard").await).await;
    assert_eq!(json["alert"]["state"], "external_above_safe");
    assert_eq!(json["external"]["risk"], "Very High Risk");
    assert_eq!(json["internal"]["risk"], "Safe");

    post(
        app.clone(),
        "/ingest/internal",
        Some(r#"{"temperature": 32, "humidity": 60}"#),
    )
    .await;

    let json = body_json(get(app, "/dashboard").await).await;
    assert_eq!(json["alert"]["state"], "internal_above_safe");
    assert_eq!(
        json["alert"]["message"],
        "Internal apparent temperature is above safe threshold!"
    );
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = build_test_app(one_observation(), Config::default());

    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
