use std::sync::Arc;

use vidgen_core::job::JobStore;

use crate::config::ServerConfig;
use crate::engine::GenerationRunner;
use crate::refine::PromptRefiner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory job store; sole source of truth for job status.
    pub jobs: Arc<JobStore>,
    /// Per-job background task launcher.
    pub runner: Arc<GenerationRunner>,
    /// Best-effort prompt refiner.
    pub refiner: Arc<PromptRefiner>,
}
