//! Handlers for the `/api/video` resource.
//!
//! `generate` creates a job and launches its background task; `status`
//! and `file` are pure read paths over the job store. Callers must poll
//! `status` and branch on it -- the existence of a job record says
//! nothing about success.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use vidgen_core::error::CoreError;
use vidgen_core::job::{JobId, JobStatus};
use vidgen_core::storage::build_video_url;
use vidgen_core::validation::{validate_duration, validate_prompt, DEFAULT_DURATION_SECS};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/video/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateVideoRequest {
    /// User prompt describing the desired video.
    pub prompt: String,
    /// Desired video length in seconds (3-120).
    #[serde(default = "default_duration")]
    pub duration_seconds: u32,
    /// Whether to expand the prompt with the AI refiner first.
    #[serde(default = "default_refine")]
    pub refine_with_ai: bool,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_refine() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct GenerateVideoResponse {
    pub job_id: JobId,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: String,
    /// Present if and only if the job is done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// POST /api/video/generate
///
/// Validate the request, create a job, optionally refine the prompt, and
/// launch the background generation task. Returns 202 with the job id
/// immediately; all remote work happens off the request path.
pub async fn generate_video(
    State(state): State<AppState>,
    Json(input): Json<GenerateVideoRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = validate_prompt(&input.prompt).map_err(AppError::Core)?;
    validate_duration(input.duration_seconds).map_err(AppError::Core)?;

    let job_id = state.jobs.create().await;

    // Refinement is best-effort and bounded; on any failure the original
    // prompt is used.
    let refined = if input.refine_with_ai {
        state.refiner.refine(prompt, input.duration_seconds).await
    } else {
        prompt.to_string()
    };

    state
        .runner
        .start(job_id, refined, input.duration_seconds)
        .await;

    tracing::info!(
        %job_id,
        duration_seconds = input.duration_seconds,
        refine_with_ai = input.refine_with_ai,
        "Generation job created",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateVideoResponse { job_id }),
    ))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/video/status/{job_id}
///
/// Return the current job snapshot. `video_url` is populated only once
/// the job is done. 404 for identifiers that were never created.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = state.jobs.get(job_id).await.map_err(AppError::Core)?;

    let video_url = (job.status == JobStatus::Done).then(|| build_video_url(job_id));

    Ok(Json(JobStatusResponse {
        job_id,
        status: job.status,
        message: job.message,
        video_url,
    }))
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// GET /api/video/file/{job_id}
///
/// Return the finished video as an attachment. 404 unless the job exists
/// and is done.
pub async fn download_video(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = state.jobs.get(job_id).await.map_err(AppError::Core)?;

    // A job that is not done has no artifact, regardless of why.
    let video_path = match (&job.status, &job.video_path) {
        (JobStatus::Done, Some(path)) => path.clone(),
        _ => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Video",
                id: job_id,
            }))
        }
    };

    let bytes = tokio::fs::read(&video_path).await.map_err(|e| {
        AppError::InternalError(format!(
            "Artifact missing for done job at {}: {e}",
            video_path.display()
        ))
    })?;

    let headers = [
        (header::CONTENT_TYPE, "video/mp4".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{job_id}.mp4\""),
        ),
    ];

    Ok((headers, bytes))
}
