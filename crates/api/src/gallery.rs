//! Durable gallery index.
//!
//! The index is one JSON document at [`GALLERY_INDEX_KEY`] in the artifact
//! store. Every write is a read-modify-write under an in-process mutex, so
//! concurrent generations and syncs on one server never lose entries.

use std::sync::Arc;

use atelier_core::gallery::{merge_entries, GalleryEntry, MergeOutcome};
use atelier_storage::keys::GALLERY_INDEX_KEY;
use atelier_storage::ArtifactStore;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

pub struct GalleryIndex {
    store: Arc<dyn ArtifactStore>,
    write_lock: Mutex<()>,
}

impl GalleryIndex {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored entries, newest first. A missing index is an empty gallery.
    pub async fn list(&self) -> AppResult<Vec<GalleryEntry>> {
        self.load().await
    }

    /// Merge `incoming` into the index and persist the result.
    pub async fn merge(&self, incoming: Vec<GalleryEntry>) -> AppResult<MergeOutcome> {
        let _guard = self.write_lock.lock().await;

        let stored = self.load().await?;
        let outcome = merge_entries(stored, incoming);

        let bytes = serde_json::to_vec(&outcome.entries)
            .map_err(|e| AppError::InternalError(format!("Failed to encode gallery index: {e}")))?;
        self.store
            .put(GALLERY_INDEX_KEY, bytes, "application/json")
            .await?;

        tracing::debug!(
            added = outcome.added,
            replaced = outcome.replaced,
            total = outcome.entries.len(),
            "Gallery index updated",
        );
        Ok(outcome)
    }

    async fn load(&self) -> AppResult<Vec<GalleryEntry>> {
        match self.store.get(GALLERY_INDEX_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::InternalError(format!("Gallery index is corrupt: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }
}
