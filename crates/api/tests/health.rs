//! Integration tests for the health check and root-level routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, test_runner_config, ScriptedWorker};

fn app() -> (axum::Router, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let storage_dir = tmp.path().to_path_buf();
    let (app, _state) = build_test_app(
        Arc::new(ScriptedWorker::new()),
        storage_dir.clone(),
        test_runner_config(storage_dir),
    );
    (app, tmp)
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (app, _tmp) = app();

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn service_index_lists_endpoints() {
    let (app, _tmp) = app();

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["service"], "AI Video Generator Backend");
    assert!(json["endpoints"].is_object());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _tmp) = app();

    let response = get(app, "/api/no-such-route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _tmp) = app();

    let response = get(app, "/health").await;
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header should be set");
    assert!(!request_id.to_str().unwrap().is_empty());
}
