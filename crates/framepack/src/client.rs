//! HTTP client for the framepack video worker.
//!
//! Wraps the worker's REST endpoints (`POST /generate`, `GET
//! /status/{id}`, and the download URL it reports) using [`reqwest`].
//! Each call carries its own bounded timeout; the fetch timeout is long
//! because the payload may be hundreds of megabytes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vidgen_core::job::JobId;

use crate::worker::{RemoteStatus, VideoWorker};

/// Timeout for the submission request.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for a single status-check request.
const POLL_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for downloading the finished video.
const FETCH_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors from the worker client, split by interaction phase.
///
/// None of these are retried by current policy: the runner converts each
/// into a terminal `failed` job state.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Submission failed (transport error, non-2xx, or malformed body).
    #[error("Failed to submit job to video worker: {0}")]
    Submission(String),

    /// A status-check request failed or returned a malformed body.
    #[error("Status check failed: {0}")]
    StatusCheck(String),

    /// Downloading the finished video failed.
    #[error("Failed to download video: {0}")]
    Fetch(String),
}

/// Request body for the worker's submission endpoint.
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
    duration_seconds: u32,
    job_id: String,
}

/// Response from the worker's submission endpoint.
///
/// The worker normally echoes a job id back; its absence is tolerated
/// (we fall back to our own id).
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: Option<String>,
}

/// Response from the worker's status endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    video_url: Option<String>,
    message: Option<String>,
}

impl StatusResponse {
    /// Interpret the worker's status payload.
    ///
    /// `done` without a `video_url` is a protocol violation and surfaces
    /// as a [`WorkerError::StatusCheck`]. Any status other than the known
    /// terminal ones is treated as still in progress, so a worker adding
    /// intermediate states does not break the poll loop.
    fn into_remote_status(self) -> Result<RemoteStatus, WorkerError> {
        match self.status.as_str() {
            "done" => match self.video_url {
                Some(video_url) => Ok(RemoteStatus::Done { video_url }),
                None => Err(WorkerError::StatusCheck(
                    "Worker reported done but no video_url".to_string(),
                )),
            },
            "failed" => Ok(RemoteStatus::Failed {
                message: self
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            }),
            "queued" => Ok(RemoteStatus::Queued),
            _ => Ok(RemoteStatus::Running),
        }
    }
}

/// HTTP client for a single video worker service.
pub struct FramepackClient {
    client: reqwest::Client,
    /// Submission endpoint, e.g. `http://worker:8082/generate`.
    api_url: String,
    /// Status endpoint base; the remote job id is appended as a path
    /// segment, e.g. `http://worker:8082/status`.
    status_url: String,
}

impl FramepackClient {
    /// Create a new client for a worker instance.
    pub fn new(api_url: String, status_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            status_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] for
    /// connection pooling.
    pub fn with_client(client: reqwest::Client, api_url: String, status_url: String) -> Self {
        Self {
            client,
            api_url,
            status_url,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, String> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(format!("worker returned {status}: {body}"));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl VideoWorker for FramepackClient {
    async fn submit(
        &self,
        job_id: JobId,
        prompt: &str,
        duration_seconds: u32,
    ) -> Result<String, WorkerError> {
        let body = SubmitRequest {
            prompt,
            duration_seconds,
            job_id: job_id.to_string(),
        };

        tracing::info!(%job_id, url = %self.api_url, "Submitting job to video worker");

        let response = self
            .client
            .post(&self.api_url)
            .timeout(SUBMIT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkerError::Submission(e.to_string()))?;

        let response = Self::ensure_success(response)
            .await
            .map_err(WorkerError::Submission)?;

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::Submission(format!("malformed response body: {e}")))?;

        // The worker is trusted to echo an id back; fall back to ours if
        // it did not.
        let remote_job_id = parsed.job_id.unwrap_or_else(|| job_id.to_string());
        tracing::info!(%job_id, remote_job_id = %remote_job_id, "Job submitted");

        Ok(remote_job_id)
    }

    async fn poll_once(&self, remote_job_id: &str) -> Result<RemoteStatus, WorkerError> {
        let response = self
            .client
            .get(format!("{}/{remote_job_id}", self.status_url))
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(|e| WorkerError::StatusCheck(e.to_string()))?;

        let response = Self::ensure_success(response)
            .await
            .map_err(WorkerError::StatusCheck)?;

        let parsed: StatusResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::StatusCheck(format!("malformed response body: {e}")))?;

        parsed.into_remote_status()
    }

    async fn fetch_artifact(
        &self,
        video_url: &str,
        destination: &Path,
    ) -> Result<(), WorkerError> {
        tracing::info!(url = %video_url, destination = %destination.display(), "Downloading video");

        let response = self
            .client
            .get(video_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| WorkerError::Fetch(e.to_string()))?;

        let response = Self::ensure_success(response)
            .await
            .map_err(WorkerError::Fetch)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkerError::Fetch(e.to_string()))?;

        write_atomically(destination, &bytes)
            .await
            .map_err(|e| WorkerError::Fetch(e.to_string()))
    }
}

/// Write `bytes` to `destination` all-or-nothing.
///
/// Writes to a `.part` sibling first and renames into place, so a failed
/// download never leaves a partial file at the final path.
pub async fn write_atomically(destination: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut part = destination.as_os_str().to_owned();
    part.push(".part");
    let part = std::path::PathBuf::from(part);

    tokio::fs::write(&part, bytes).await?;
    match tokio::fs::rename(&part, destination).await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Rename failed; do not leave the temp file behind.
            let _ = tokio::fs::remove_file(&part).await;
            Err(e)
        }
    }
}
