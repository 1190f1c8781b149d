//! Handlers for photo restyling.
//!
//! A generation request blocks while the batch is tracked: the input photo
//! is stored, the provider queues one job per requested image, and the
//! response carries the final [`BatchResult`] once every job is terminal or
//! the polling budget runs out.

use atelier_core::gallery::GalleryEntry;
use atelier_core::generation::{fit_dimension, GenerationParams, DEFAULT_STYLE_STRENGTH, MIN_COUNT};
use atelier_core::image_probe::probe_image;
use atelier_core::job::BatchResult;
use atelier_core::types::JobId;
use atelier_provider::messages::{GenerationStatus, SubmitGenerationRequest};
use atelier_provider::{BatchTracker, JobStatusProvider};
use atelier_storage::keys::{content_key, INPUTS_PREFIX};
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::multipart::MultipartForm;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload of `POST /api/v1/generations`.
#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub batch_id: Uuid,
    /// Public URL of the stored input photo.
    pub source_image_url: String,
    #[serde(flatten)]
    pub result: BatchResult,
}

/// POST /api/v1/generations
///
/// Multipart form with a required `image` file and optional `model_id`,
/// `prompt`, `count`, `width`, `height` and `style_strength` fields.
/// Omitted dimensions are derived from the uploaded photo.
///
/// Responds 200 when at least one image succeeded, 502 when every job
/// failed and 504 when nothing succeeded before the polling budget ran out.
pub async fn create_generation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<GenerationOutcome>>> {
    let mut form = MultipartForm::read(multipart).await?;
    let upload = form
        .take_file("image")
        .ok_or_else(|| AppError::BadRequest("Missing required 'image' file".into()))?;

    let info = probe_image(&upload.bytes)?;
    let params = GenerationParams {
        count: form.parse("count")?.unwrap_or(MIN_COUNT),
        width: form.parse("width")?.unwrap_or_else(|| fit_dimension(info.width)),
        height: form.parse("height")?.unwrap_or_else(|| fit_dimension(info.height)),
        style_strength: form
            .parse("style_strength")?
            .unwrap_or(DEFAULT_STYLE_STRENGTH),
        model_id: form.text("model_id").map(str::to_string),
        prompt: form.text("prompt").map(str::to_string),
    };
    params.validate()?;

    let batch_id = Uuid::new_v4();
    let key = content_key(INPUTS_PREFIX, &upload.bytes, info.extension());
    let source_image_url = state
        .store
        .put(&key, upload.bytes, info.content_type())
        .await?;
    tracing::info!(
        %batch_id,
        key = %key,
        width = params.width,
        height = params.height,
        count = params.count,
        "Input image stored",
    );

    let request = SubmitGenerationRequest {
        input_image_url: source_image_url.clone(),
        model_id: params.model_id.clone(),
        prompt: params.prompt.clone(),
        num_images: params.count,
        width: params.width,
        height: params.height,
        style_strength: params.style_strength,
    };
    let job_ids = state.provider.submit_generation(&request).await?;
    tracing::info!(%batch_id, jobs = job_ids.len(), "Tracking generation batch");

    let result = BatchTracker::new(state.provider.as_ref(), state.config.tracker)
        .with_store(state.store.as_ref())
        .await_completion_with(job_ids, |progress| {
            tracing::debug!(
                %batch_id,
                attempt = progress.attempt,
                pending = progress.pending,
                succeeded = progress.succeeded,
                failed = progress.failed,
                "Batch progress",
            );
        })
        .await?
        .into_outcome()?;

    tracing::info!(
        %batch_id,
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        pending = result.pending.len(),
        timed_out = result.timed_out,
        "Generation batch finished",
    );

    record_in_gallery(&state, &result, &source_image_url, params.model_id.as_deref()).await;

    Ok(Json(DataResponse {
        data: GenerationOutcome {
            batch_id,
            source_image_url,
            result,
        },
    }))
}

/// GET /api/v1/generations/{id}
///
/// Current provider status of a single generation job.
pub async fn get_generation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<GenerationStatus>>> {
    let status = state.provider.job_status(&JobId::new(id)).await?;
    Ok(Json(DataResponse { data: status }))
}

/// Append the batch's successes to the gallery. The images already exist,
/// so an index failure is logged rather than failing the request.
async fn record_in_gallery(
    state: &AppState,
    result: &BatchResult,
    source_image_url: &str,
    model_id: Option<&str>,
) {
    let now = chrono::Utc::now();
    let entries = result
        .succeeded
        .iter()
        .map(|job| GalleryEntry {
            id: job.id.to_string(),
            image_url: job.artifact_url.clone(),
            source_image_url: Some(source_image_url.to_string()),
            model_id: model_id.map(str::to_string),
            created_at: now,
        })
        .collect();

    if let Err(e) = state.gallery.merge(entries).await {
        tracing::warn!(error = %e, "Failed to record generations in gallery");
    }
}
