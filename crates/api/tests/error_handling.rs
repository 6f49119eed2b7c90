//! Tests for the `AppError` to HTTP response mapping.
//!
//! Every error leaving a handler must produce a JSON body of the form
//! `{"error": "...", "code": "..."}` with the right status code, and
//! internal errors must not leak their message to the client.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use uuid::Uuid;
use vidgen_api::error::AppError;
use vidgen_core::error::CoreError;

async fn response_parts(error: AppError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_maps_to_404() {
    let id = Uuid::new_v4();
    let (status, body) = response_parts(AppError::Core(CoreError::NotFound {
        entity: "Job",
        id,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], format!("Job with id {id} not found"));
}

#[tokio::test]
async fn validation_error_maps_to_400_with_message() {
    let (status, body) = response_parts(AppError::Core(CoreError::Validation(
        "Prompt must not be empty".to_string(),
    )))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Prompt must not be empty");
}

#[tokio::test]
async fn bad_request_maps_to_400() {
    let (status, body) = response_parts(AppError::BadRequest("malformed body".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["error"], "malformed body");
}

#[tokio::test]
async fn internal_errors_do_not_leak_details() {
    let (status, body) =
        response_parts(AppError::InternalError("db password is hunter2".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");

    let (status, body) = response_parts(AppError::Core(CoreError::Internal(
        "filesystem exploded".to_string(),
    )))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_errors_convert_via_from() {
    let error: AppError = CoreError::Validation("too long".to_string()).into();
    assert_matches!(&error, AppError::Core(CoreError::Validation(_)));

    let (status, _body) = response_parts(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
