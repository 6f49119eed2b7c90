pub mod health;
pub mod video;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /video/generate            submit a generation job (POST)
/// /video/status/{job_id}     job status and video URL (GET)
/// /video/file/{job_id}       download the generated video (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/video", video::router())
}

/// GET / -- service index listing the available endpoints.
async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "AI Video Generator Backend",
        "endpoints": {
            "POST /api/video/generate": "Submit a video generation job",
            "GET /api/video/status/{job_id}": "Get job status and video URL",
            "GET /api/video/file/{job_id}": "Download the generated video",
        }
    }))
}

/// Root-level routes (service index; mounted next to `/health`).
pub fn index_router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
