//! Settings API tests.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::fixtures::{AGAIN, GOOD};
use common::{TestContext, NOW};
use srs_core::DAY_MS;

#[tokio::test]
async fn test_get_default_settings() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/api/srs/settings").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["id"], "default");
    assert_eq!(body["name"], "SuperMemo 2 (Default)");
    assert_eq!(body["min_ease_factor"], 1.3);
    assert_eq!(body["max_ease_factor"], 2.5);
    assert_eq!(body["initial_interval"], 1);
    assert_eq!(body["second_interval"], 6);
    assert_eq!(body["correct_threshold"], 3);
    assert_eq!(body["max_interval"], 365);
    assert_eq!(body["created_at"], NOW);
}

#[tokio::test]
async fn test_partial_update_changes_only_supplied_fields() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let before: Value = server.get("/api/srs/settings").await.json();

    ctx.advance_days(1);
    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "max_interval": 200 }))
        .await;
    response.assert_status_ok();
    let after: Value = response.json();

    assert_eq!(after["max_interval"], 200);
    assert_eq!(after["updated_at"], NOW + DAY_MS);
    assert_eq!(after["created_at"], NOW);
    for field in ["min_ease_factor", "max_ease_factor", "second_interval", "hard_penalty"] {
        assert_eq!(after[field], before[field], "{field}");
    }

    let stored: Value = server.get("/api/srs/settings").await.json();
    assert_eq!(stored, after);
}

#[tokio::test]
async fn test_inverted_ease_bounds_are_rejected_without_change() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let before: Value = server.get("/api/srs/settings").await.json();

    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "min_ease_factor": 2.0, "max_ease_factor": 1.5 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert!(errors.contains(&"Minimum ease factor must be less than maximum ease factor"));

    let after: Value = server.get("/api/srs/settings").await.json();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_validation_reports_every_violation() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/srs/settings")
        .json(&json!({
            "min_ease_factor": 3.5,
            "initial_interval": 0,
            "max_interval": 0,
            "correct_threshold": 5,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();

    for expected in [
        "Minimum ease factor must be less than maximum ease factor",
        "Minimum ease factor must be between 1.0 and 3.0",
        "Initial interval must be at least 1 day",
        "Maximum interval must be at least 1 day",
        "Correct threshold must be less than maximum difficulty",
    ] {
        assert!(errors.contains(&expected), "missing {expected:?} in {errors:?}");
    }
}

#[tokio::test]
async fn test_malformed_settings_body_is_bad_request() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "max_interval": "forever" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_immutable_fields_are_ignored() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "id": "other", "created_at": 5, "name": "Custom" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["id"], "default");
    assert_eq!(body["created_at"], NOW);
    assert_eq!(body["name"], "Custom");
}

#[tokio::test]
async fn test_reset_restores_defaults_and_keeps_created_at() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post("/api/srs/settings")
        .json(&json!({ "max_interval": 90, "easy_bonus": 0.2, "name": "Mine" }))
        .await
        .assert_status_ok();

    ctx.advance_days(2);
    let response = server.post("/api/srs/settings/reset").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["max_interval"], 365);
    assert_eq!(body["easy_bonus"], 0.1);
    assert_eq!(body["name"], "SuperMemo 2 (Default)");
    assert_eq!(body["created_at"], NOW);
    assert_eq!(body["updated_at"], NOW + 2 * DAY_MS);
}

#[tokio::test]
async fn test_updated_settings_drive_scheduling() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let id = ctx.create_card(&server, "card-1").await;

    server
        .post("/api/srs/settings")
        .json(&json!({ "second_interval": 3, "max_interval": 10 }))
        .await
        .assert_status_ok();

    ctx.review(&server, &id, GOOD).await;
    let second = ctx.review(&server, &id, GOOD).await;
    assert_eq!(second["interval_days"], 3);

    // floor(3 * 2.5) = 7, then 17 capped at 10
    let third = ctx.review(&server, &id, GOOD).await;
    assert_eq!(third["interval_days"], 7);
    let fourth = ctx.review(&server, &id, GOOD).await;
    assert_eq!(fourth["interval_days"], 10);
}

#[tokio::test]
async fn test_oversized_intervals_are_rejected() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let before: Value = server.get("/api/srs/settings").await.json();

    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "lapse_min_interval": 1_000_000_000_000_i64 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["errors"],
        json!(["Lapse minimum interval must not exceed maximum interval"])
    );

    let response = server
        .post("/api/srs/settings")
        .json(&json!({ "max_interval": 40_000 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let after: Value = server.get("/api/srs/settings").await.json();
    assert_eq!(after, before);

    // Scheduling keeps working on the unchanged profile
    let lapse = ctx.review(&server, "card-1", AGAIN).await;
    assert_eq!(lapse["interval_days"], 1);
    assert_eq!(lapse["next_review"], NOW + DAY_MS);
}
