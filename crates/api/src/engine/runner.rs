//! Per-job generation runner.
//!
//! [`GenerationRunner`] owns the submit -> poll -> fetch sequence for each
//! job. `start` spawns one background task per job and returns
//! immediately; the task writes every outcome, including its own errors,
//! into the [`JobStore`] as a terminal state. Nothing escapes the task as
//! an uncaught fault.
//!
//! There are no retries beyond the polling loop itself: a submission,
//! status-check, or download error fails the job on the spot. That is a
//! deliberate fail-fast policy, not an oversight.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use vidgen_core::job::{JobId, JobStore};
use vidgen_core::storage::video_file_path;
use vidgen_framepack::{RemoteStatus, VideoWorker};

/// Maximum number of status-check requests per job.
const DEFAULT_MAX_POLLS: u32 = 240;
/// Sleep between status checks. Together with [`DEFAULT_MAX_POLLS`] this
/// gives a soft ceiling of about 20 minutes of wall-clock wait.
const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

/// Tunables for the polling loop.
///
/// Production uses the defaults; tests shrink the poll budget and zero the
/// delay to run the loop deterministically.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub max_polls: u32,
    pub poll_delay: Duration,
    /// Directory where finished videos are materialized.
    pub storage_dir: PathBuf,
}

impl RunnerConfig {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            poll_delay: DEFAULT_POLL_DELAY,
            storage_dir,
        }
    }
}

/// Launches and tracks one background task per job.
///
/// Handles are retained so the tasks stay observable and tests can await
/// completion deterministically. There is no admission control: every
/// created job gets its own task immediately.
pub struct GenerationRunner {
    jobs: Arc<JobStore>,
    worker: Arc<dyn VideoWorker>,
    config: RunnerConfig,
    /// Background task handles indexed by job id.
    tasks: Mutex<HashMap<JobId, JoinHandle<()>>>,
}

impl GenerationRunner {
    pub fn new(jobs: Arc<JobStore>, worker: Arc<dyn VideoWorker>, config: RunnerConfig) -> Self {
        Self {
            jobs,
            worker,
            config,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn the background task for a freshly created job.
    ///
    /// Returns as soon as the task is spawned; the caller never waits on
    /// remote work. At most one task ever exists per job id because job
    /// ids are created once and never reused.
    pub async fn start(&self, job_id: JobId, prompt: String, duration_seconds: u32) {
        let jobs = Arc::clone(&self.jobs);
        let worker = Arc::clone(&self.worker);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            run_job(&jobs, worker.as_ref(), &config, job_id, &prompt, duration_seconds).await;
        });

        self.tasks.lock().await.insert(job_id, handle);
    }

    /// Await the background task for a job, if one was started.
    ///
    /// Returns `true` if a task existed and ran to completion. Used by
    /// tests and available for diagnostics; production request handling
    /// never calls this.
    pub async fn wait(&self, job_id: JobId) -> bool {
        let handle = self.tasks.lock().await.remove(&job_id);
        match handle {
            Some(handle) => handle.await.is_ok(),
            None => false,
        }
    }
}

/// Drive one job from `Running` to a terminal state.
///
/// Every error path ends in `set_failed`; the job record is the only
/// place outcomes are reported.
async fn run_job(
    jobs: &JobStore,
    worker: &dyn VideoWorker,
    config: &RunnerConfig,
    job_id: JobId,
    prompt: &str,
    duration_seconds: u32,
) {
    jobs.set_running(job_id).await;

    // 1) Submit. Submission failures are terminal; there is no retry.
    let remote_job_id = match worker.submit(job_id, prompt, duration_seconds).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(%job_id, error = %e, "Submission to video worker failed");
            jobs.set_failed(job_id, &e.to_string()).await;
            return;
        }
    };
    jobs.set_remote_job(job_id, &remote_job_id).await;

    // 2) Poll until the worker reports a terminal status or the poll
    //    budget runs out.
    for attempt in 0..config.max_polls {
        match worker.poll_once(&remote_job_id).await {
            Ok(RemoteStatus::Done { video_url }) => {
                // 3) Materialize the artifact locally, keyed by our job id.
                let destination = video_file_path(&config.storage_dir, job_id);
                match worker.fetch_artifact(&video_url, &destination).await {
                    Ok(()) => {
                        tracing::info!(
                            %job_id,
                            remote_job_id = %remote_job_id,
                            path = %destination.display(),
                            "Video generation completed",
                        );
                        jobs.set_done(job_id, destination).await;
                    }
                    Err(e) => {
                        tracing::error!(%job_id, error = %e, "Video download failed");
                        jobs.set_failed(job_id, &e.to_string()).await;
                    }
                }
                return;
            }
            Ok(RemoteStatus::Failed { message }) => {
                tracing::warn!(%job_id, remote_job_id = %remote_job_id, %message, "Worker reported failure");
                jobs.set_failed(job_id, &format!("Worker failed: {message}"))
                    .await;
                return;
            }
            Ok(RemoteStatus::Queued | RemoteStatus::Running) => {
                tracing::debug!(%job_id, attempt, "Job still in progress");
                tokio::time::sleep(config.poll_delay).await;
            }
            Err(e) => {
                // Transport errors during polling are terminal: fast,
                // visible failure instead of masking a flaky worker.
                tracing::error!(%job_id, error = %e, "Status check failed");
                jobs.set_failed(job_id, &e.to_string()).await;
                return;
            }
        }
    }

    tracing::warn!(%job_id, max_polls = config.max_polls, "Polling budget exhausted");
    jobs.set_failed(job_id, "Video generation timed out").await;
}
