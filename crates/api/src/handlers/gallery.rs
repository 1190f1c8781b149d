//! Handlers for the gallery of generated images.

use atelier_core::gallery::{GalleryEntry, MAX_GALLERY_ENTRIES};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/gallery/sync`.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub entries: Vec<GalleryEntry>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// Merged gallery, newest first.
    pub entries: Vec<GalleryEntry>,
    pub added: usize,
    pub replaced: usize,
}

/// GET /api/v1/gallery
///
/// All gallery entries, newest first.
pub async fn list_gallery(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<GalleryEntry>>>> {
    let entries = state.gallery.list().await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/gallery/sync
///
/// Merge client-held records into the durable index and return the result.
pub async fn sync_gallery(
    State(state): State<AppState>,
    Json(input): Json<SyncRequest>,
) -> AppResult<Json<DataResponse<SyncResponse>>> {
    if input.entries.len() > MAX_GALLERY_ENTRIES {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_GALLERY_ENTRIES} entries can be synced at once"
        )));
    }

    let submitted = input.entries.len();
    let outcome = state.gallery.merge(input.entries).await?;
    tracing::info!(
        submitted,
        added = outcome.added,
        replaced = outcome.replaced,
        "Gallery synced",
    );

    Ok(Json(DataResponse {
        data: SyncResponse {
            entries: outcome.entries,
            added: outcome.added,
            replaced: outcome.replaced,
        },
    }))
}
