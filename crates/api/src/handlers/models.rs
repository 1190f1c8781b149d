//! Handlers for custom model training.
//!
//! Training images are stored in the artifact store and handed to the
//! provider by URL; the provider owns the training lifecycle.

use atelier_core::error::CoreError;
use atelier_core::image_probe::probe_image;
use atelier_core::training::{validate_model_name, validate_training_image_count, ModelKind};
use atelier_provider::messages::{CreateModelRequest, ModelRecord};
use atelier_provider::ProviderError;
use atelier_storage::keys::{content_key, TRAINING_PREFIX};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::multipart::MultipartForm;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/models
///
/// Multipart form with `name`, `kind` (`style`, `person` or `object`) and
/// one or more `images` files. Returns 201 with the provider's record.
pub async fn create_model(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ModelRecord>>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let name = form.text("name").unwrap_or_default().to_string();
    validate_model_name(&name)?;
    let kind: ModelKind = form
        .text("kind")
        .ok_or_else(|| CoreError::Validation("kind is required".into()))?
        .parse()?;

    let images = form.take_files("images");
    validate_training_image_count(images.len())?;

    // Probe everything before storing anything.
    let probed = images
        .into_iter()
        .map(|file| probe_image(&file.bytes).map(|info| (file, info)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut image_urls = Vec::with_capacity(probed.len());
    for (file, info) in probed {
        let key = content_key(TRAINING_PREFIX, &file.bytes, info.extension());
        image_urls.push(state.store.put(&key, file.bytes, info.content_type()).await?);
    }

    let request = CreateModelRequest {
        name,
        kind,
        image_urls,
    };
    let model = state.provider.create_model(&request).await?;

    tracing::info!(
        model_id = %model.id,
        kind = %model.kind,
        images = request.image_urls.len(),
        "Model training started",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: model })))
}

/// GET /api/v1/models
pub async fn list_models(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ModelRecord>>>> {
    let models = state.provider.list_models().await?;
    Ok(Json(DataResponse { data: models }))
}

/// GET /api/v1/models/{id}
///
/// One model's training status.
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<ModelRecord>>> {
    let model = state
        .provider
        .get_model(&id)
        .await
        .map_err(|e| not_found_as_core(e, "Model", &id))?;
    Ok(Json(DataResponse { data: model }))
}

fn not_found_as_core(err: ProviderError, entity: &'static str, id: &str) -> AppError {
    if err.is_not_found() {
        AppError::Core(CoreError::NotFound {
            entity,
            id: id.to_string(),
        })
    } else {
        AppError::Provider(err)
    }
}
