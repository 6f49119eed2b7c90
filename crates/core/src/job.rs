//! Job lifecycle model and the in-memory job store.
//!
//! A [`Job`] tracks one generation request from creation to a terminal
//! state. The [`JobStore`] is the sole source of truth for job status:
//! handlers read snapshots out of it, and the single background task
//! owning a job writes transitions into it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::CoreError;

/// Unique identifier for a generation job (UUID v4, never reused).
pub type JobId = uuid::Uuid;

/// Lifecycle state of a job.
///
/// Transitions are one-directional: `Queued -> Running -> {Done, Failed}`.
/// `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// Lowercase wire representation (`"queued"`, `"running"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Whether no further transition can leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// One generation request and its tracked lifecycle.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Human-readable detail for the current status; updated on every
    /// transition.
    pub message: String,
    /// Local path of the downloaded artifact. Set if and only if the job
    /// is `Done`.
    pub video_path: Option<std::path::PathBuf>,
    /// Identifier assigned by the remote worker once submission succeeds.
    pub remote_job_id: Option<String>,
    /// Creation time, kept for diagnostics only (no eviction policy).
    pub created_at: DateTime<Utc>,
}

/// Concurrency-safe mapping from [`JobId`] to [`Job`].
///
/// All operations are safe to call from any number of concurrent tasks.
/// Reads return a full snapshot clone, so a `get` racing an update observes
/// either the pre- or post-update record, never a torn one. Updates to
/// unknown ids are silently ignored: they originate from detached
/// background tasks that must never crash the process.
///
/// Records live for the process lifetime; there is no deletion path.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh job in `Queued` state and return its id.
    ///
    /// The job is visible to readers as soon as this returns, before any
    /// background work starts.
    pub async fn create(&self) -> JobId {
        let id = uuid::Uuid::new_v4();
        let job = Job {
            id,
            status: JobStatus::Queued,
            message: "Job created".to_string(),
            video_path: None,
            remote_job_id: None,
            created_at: Utc::now(),
        };
        self.jobs.write().await.insert(id, job);
        id
    }

    /// Return a snapshot copy of the job, or `NotFound` for ids that were
    /// never created.
    pub async fn get(&self, id: JobId) -> Result<Job, CoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound { entity: "Job", id })
    }

    /// Transition the job to `Running`.
    pub async fn set_running(&self, id: JobId) {
        self.update(id, |job| {
            job.status = JobStatus::Running;
            job.message = "Generating video...".to_string();
        })
        .await;
    }

    /// Record the identifier the remote worker assigned at submission.
    pub async fn set_remote_job(&self, id: JobId, remote_job_id: &str) {
        self.update(id, |job| {
            job.remote_job_id = Some(remote_job_id.to_string());
        })
        .await;
    }

    /// Transition the job to `Done` with the local artifact path.
    pub async fn set_done(&self, id: JobId, video_path: std::path::PathBuf) {
        self.update(id, |job| {
            job.status = JobStatus::Done;
            job.message = "Completed".to_string();
            job.video_path = Some(video_path);
        })
        .await;
    }

    /// Transition the job to `Failed` with a human-readable message.
    pub async fn set_failed(&self, id: JobId, message: &str) {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.message = message.to_string();
        })
        .await;
    }

    /// Apply a mutation atomically.
    ///
    /// No-op for unknown ids and for jobs already in a terminal state
    /// (terminal states are final by contract; the store enforces it
    /// rather than trusting every caller).
    async fn update(&self, id: JobId, mutate: impl FnOnce(&mut Job)) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            if job.status.is_terminal() {
                return;
            }
            mutate(job);
        }
    }
}
