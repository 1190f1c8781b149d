#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use atelier_api::config::{ProviderConfig, ServerConfig, StorageConfig};
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_core::training::ModelStatus;
use atelier_core::types::JobId;
use atelier_provider::messages::{
    CreateModelRequest, GenerationStatus, ModelRecord, ProviderJobStatus, SubmitGenerationRequest,
};
use atelier_provider::promotion::PromotionPolicy;
use atelier_provider::{GenerationProvider, JobStatusProvider, ProviderError, TrackerConfig};
use atelier_storage::memory::MemoryArtifactStore;
use atelier_storage::ArtifactStore;

pub const PUBLIC_BASE_URL: &str = "http://localhost:3000/artifacts";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses an in-memory store and a tracker that polls three times with no
/// delay, so batches resolve instantly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 16 * 1024 * 1024,
        provider: ProviderConfig {
            api_url: "http://provider.test".to_string(),
            api_key: None,
        },
        tracker: TrackerConfig {
            max_attempts: 3,
            poll_interval: Duration::ZERO,
            promotion: PromotionPolicy::None,
        },
        storage: StorageConfig::Memory {
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
    }
}

/// A running router plus handles to the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<FakeProvider>,
    pub store: Arc<MemoryArtifactStore>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers, backed
/// by `provider` and a fresh in-memory artifact store.
pub fn build_test_app(provider: FakeProvider) -> TestApp {
    build_test_app_with(provider, test_config())
}

pub fn build_test_app_with(provider: FakeProvider, config: ServerConfig) -> TestApp {
    let provider = Arc::new(provider);
    let store = Arc::new(MemoryArtifactStore::new(PUBLIC_BASE_URL.to_string()).unwrap());
    let state = AppState::new(config.clone(), provider.clone(), store.clone());

    TestApp {
        router: build_app_router(state, &config),
        provider,
        store,
    }
}

/// Same as [`build_test_app_with`] but with a caller-supplied store.
pub fn build_test_router(
    provider: FakeProvider,
    store: Arc<dyn ArtifactStore>,
    config: ServerConfig,
) -> Router {
    let state = AppState::new(config.clone(), Arc::new(provider), store);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fake provider
// ---------------------------------------------------------------------------

/// Provider double with scripted job statuses.
///
/// Each job replays its status list one entry per query; the last entry
/// repeats. Unknown IDs answer 404 like the real provider.
#[derive(Default)]
pub struct FakeProvider {
    submit_ids: Vec<JobId>,
    scripts: HashMap<JobId, Vec<GenerationStatus>>,
    models: Vec<ModelRecord>,
    queries: Mutex<HashMap<JobId, usize>>,
    pub submissions: Mutex<Vec<SubmitGenerationRequest>>,
    pub created_models: Mutex<Vec<CreateModelRequest>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job that `submit_generation` returns, with its status script.
    pub fn with_job(mut self, id: &str, script: Vec<GenerationStatus>) -> Self {
        self.submit_ids.push(JobId::from(id));
        self.scripts.insert(JobId::from(id), script);
        self
    }

    pub fn with_model(mut self, model: ModelRecord) -> Self {
        self.models.push(model);
        self
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_submission(&self) -> Option<SubmitGenerationRequest> {
        self.submissions.lock().unwrap().last().cloned()
    }

    pub fn queries_for(&self, id: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .get(&JobId::from(id))
            .copied()
            .unwrap_or(0)
    }
}

fn not_found() -> ProviderError {
    ProviderError::ApiError {
        status: 404,
        body: "not found".into(),
    }
}

#[async_trait]
impl JobStatusProvider for FakeProvider {
    async fn job_status(&self, id: &JobId) -> Result<GenerationStatus, ProviderError> {
        let script = self.scripts.get(id).ok_or_else(not_found)?;
        let round = {
            let mut queries = self.queries.lock().unwrap();
            let count = queries.entry(id.clone()).or_insert(0);
            *count += 1;
            *count - 1
        };
        Ok(script[round.min(script.len() - 1)].clone())
    }
}

#[async_trait]
impl GenerationProvider for FakeProvider {
    async fn submit_generation(
        &self,
        request: &SubmitGenerationRequest,
    ) -> Result<Vec<JobId>, ProviderError> {
        self.submissions.lock().unwrap().push(request.clone());
        if self.submit_ids.is_empty() {
            return Err(ProviderError::EmptySubmission);
        }
        Ok(self.submit_ids.clone())
    }

    async fn create_model(
        &self,
        request: &CreateModelRequest,
    ) -> Result<ModelRecord, ProviderError> {
        self.created_models.lock().unwrap().push(request.clone());
        Ok(ModelRecord {
            id: "model-new".into(),
            name: request.name.clone(),
            kind: request.kind,
            status: ModelStatus::Queued,
            created_at: None,
            error: None,
        })
    }

    async fn get_model(&self, id: &str) -> Result<ModelRecord, ProviderError> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        Ok(self.models.clone())
    }
}

// ---------------------------------------------------------------------------
// Status builders
// ---------------------------------------------------------------------------

fn status(id: &str, status: ProviderJobStatus) -> GenerationStatus {
    GenerationStatus {
        id: JobId::from(id),
        status,
        output_url: None,
        error: None,
    }
}

pub fn processing(id: &str) -> GenerationStatus {
    status(id, ProviderJobStatus::Processing)
}

pub fn succeeded(id: &str, url: &str) -> GenerationStatus {
    GenerationStatus {
        output_url: Some(url.to_string()),
        ..status(id, ProviderJobStatus::Succeeded)
    }
}

pub fn failed(id: &str, error: &str) -> GenerationStatus {
    GenerationStatus {
        error: Some(error.to_string()),
        ..status(id, ProviderJobStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_multipart(app: Router, uri: &str, form: MultipartBody) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "atelier-test-boundary";

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, name: &str, width: u32, height: u32) -> Self {
        self.file(name, "photo.png", "image/png", &png_bytes(width, height))
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

/// Encode a blank PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
