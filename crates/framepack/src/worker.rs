//! The [`VideoWorker`] seam between the generation runner and whatever
//! service actually synthesizes video.

use std::path::Path;

use vidgen_core::job::JobId;

use crate::client::WorkerError;

/// Status reported by the remote worker for one of its jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Accepted but not started yet.
    Queued,
    /// Generation in progress.
    Running,
    /// Finished; the video can be downloaded from `video_url`.
    Done { video_url: String },
    /// The worker gave up on the job.
    Failed { message: String },
}

/// Remote interactions needed to run one generation job.
///
/// Implementations must be safe to share across the per-job background
/// tasks (`Send + Sync`); the runner holds one instance behind an `Arc`.
#[async_trait::async_trait]
pub trait VideoWorker: Send + Sync {
    /// Submit a generation request.
    ///
    /// `job_id` is our local identifier; the worker is expected to echo
    /// back its own. Returns the remote job identifier to poll with.
    async fn submit(
        &self,
        job_id: JobId,
        prompt: &str,
        duration_seconds: u32,
    ) -> Result<String, WorkerError>;

    /// Issue one status-check request for a previously submitted job.
    async fn poll_once(&self, remote_job_id: &str) -> Result<RemoteStatus, WorkerError>;

    /// Download the finished video to `destination`.
    ///
    /// All-or-nothing: on error the destination must not be left behind
    /// as a partial file.
    async fn fetch_artifact(&self, video_url: &str, destination: &Path)
        -> Result<(), WorkerError>;
}
