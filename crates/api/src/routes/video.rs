//! Route definitions for the `/api/video` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/api/video`.
///
/// ```text
/// POST   /generate           -> generate_video
/// GET    /status/{job_id}    -> get_status
/// GET    /file/{job_id}      -> download_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(video::generate_video))
        .route("/status/{job_id}", get(video::get_status))
        .route("/file/{job_id}", get(video::download_video))
}
