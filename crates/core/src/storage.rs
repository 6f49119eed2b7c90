//! Artifact storage layout.
//!
//! One MP4 per job, named deterministically by job id under the configured
//! storage directory. The background task writes the file exactly once;
//! the download handler and the static `/videos` mount read it.

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::job::JobId;

/// Local filesystem path of the artifact for a job.
pub fn video_file_path(storage_dir: &Path, job_id: JobId) -> PathBuf {
    storage_dir.join(format!("{job_id}.mp4"))
}

/// Public URL under which the artifact is served once the job is done.
pub fn build_video_url(job_id: JobId) -> String {
    format!("/videos/{job_id}.mp4")
}

/// Create the storage directory if it does not exist yet.
pub fn ensure_storage_dir(storage_dir: &Path) -> Result<(), CoreError> {
    std::fs::create_dir_all(storage_dir).map_err(|e| {
        CoreError::Internal(format!(
            "Failed to create storage directory {}: {e}",
            storage_dir.display()
        ))
    })
}
