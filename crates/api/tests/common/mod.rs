use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use vidgen_api::config::ServerConfig;
use vidgen_api::engine::{GenerationRunner, RunnerConfig};
use vidgen_api::refine::PromptRefiner;
use vidgen_api::routes;
use vidgen_api::state::AppState;
use vidgen_core::job::{JobId, JobStore};
use vidgen_framepack::{RemoteStatus, VideoWorker, WorkerError};

// ---------------------------------------------------------------------------
// Scripted worker
// ---------------------------------------------------------------------------

/// How the fake worker responds to `submit`.
pub enum SubmitBehavior {
    /// Return a remote job id derived from the local one.
    Succeed,
    /// Fail with the given message.
    Fail(String),
    /// Never return. Keeps a job observable in its pre-terminal states.
    Stall,
}

/// How the fake worker responds to `fetch_artifact`.
pub enum FetchBehavior {
    /// Write the given bytes to the destination.
    Write(Vec<u8>),
    /// Fail with the given message.
    Fail(String),
}

/// A [`VideoWorker`] whose responses are scripted by the test.
///
/// Poll responses are consumed in order; once the script is exhausted,
/// further polls report `queued` (still in progress). Call counters let
/// tests assert which remote interactions happened.
pub struct ScriptedWorker {
    submit: SubmitBehavior,
    polls: Mutex<VecDeque<Result<RemoteStatus, WorkerError>>>,
    fetch: FetchBehavior,
    pub submit_calls: AtomicU32,
    pub poll_calls: AtomicU32,
    pub fetch_calls: AtomicU32,
}

impl ScriptedWorker {
    pub fn new() -> Self {
        Self {
            submit: SubmitBehavior::Succeed,
            polls: Mutex::new(VecDeque::new()),
            fetch: FetchBehavior::Write(b"fake mp4 bytes".to_vec()),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub fn with_submit(mut self, behavior: SubmitBehavior) -> Self {
        self.submit = behavior;
        self
    }

    pub fn with_polls(self, polls: Vec<Result<RemoteStatus, WorkerError>>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    pub fn with_fetch(mut self, behavior: FetchBehavior) -> Self {
        self.fetch = behavior;
        self
    }
}

#[async_trait::async_trait]
impl VideoWorker for ScriptedWorker {
    async fn submit(
        &self,
        job_id: JobId,
        _prompt: &str,
        _duration_seconds: u32,
    ) -> Result<String, WorkerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match &self.submit {
            SubmitBehavior::Succeed => Ok(format!("remote-{job_id}")),
            SubmitBehavior::Fail(msg) => Err(WorkerError::Submission(msg.clone())),
            SubmitBehavior::Stall => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn poll_once(&self, _remote_job_id: &str) -> Result<RemoteStatus, WorkerError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RemoteStatus::Queued))
    }

    async fn fetch_artifact(
        &self,
        _video_url: &str,
        destination: &Path,
    ) -> Result<(), WorkerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fetch {
            FetchBehavior::Write(bytes) => {
                tokio::fs::write(destination, bytes)
                    .await
                    .map_err(|e| WorkerError::Fetch(e.to_string()))
            }
            FetchBehavior::Fail(msg) => Err(WorkerError::Fetch(msg.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        video_storage_dir: storage_dir,
        groq_api_key: None,
    }
}

/// Runner tunables for tests: zero poll delay, small poll budget.
pub fn test_runner_config(storage_dir: PathBuf) -> RunnerConfig {
    let mut config = RunnerConfig::new(storage_dir);
    config.max_polls = 8;
    config.poll_delay = Duration::ZERO;
    config
}

/// Build the full application router with all middleware layers, plus the
/// shared state so tests can reach the store and runner directly.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(
    worker: Arc<dyn VideoWorker>,
    storage_dir: PathBuf,
    runner_config: RunnerConfig,
) -> (Router, AppState) {
    let config = test_config(storage_dir);
    let jobs = Arc::new(JobStore::new());
    let runner = Arc::new(GenerationRunner::new(
        Arc::clone(&jobs),
        worker,
        runner_config,
    ));
    let refiner = Arc::new(PromptRefiner::new(None));

    let state = AppState {
        config: Arc::new(config),
        jobs,
        runner,
        refiner,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::index_router())
        .nest("/api", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state.clone());

    (app, state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    use http_body_util::BodyExt;
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
