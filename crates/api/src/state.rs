use std::sync::Arc;

use atelier_provider::GenerationProvider;
use atelier_storage::local::LocalArtifactStore;
use atelier_storage::memory::MemoryArtifactStore;
use atelier_storage::s3::S3ArtifactStore;
use atelier_storage::{ArtifactStore, StorageError};

use crate::config::{ServerConfig, StorageConfig};
use crate::gallery::GalleryIndex;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (tracker budget, storage backend, limits).
    pub config: Arc<ServerConfig>,
    /// Generation provider client.
    pub provider: Arc<dyn GenerationProvider>,
    /// Durable artifact storage.
    pub store: Arc<dyn ArtifactStore>,
    /// Gallery index persisted in `store`.
    pub gallery: Arc<GalleryIndex>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            gallery: Arc::new(GalleryIndex::new(Arc::clone(&store))),
            store,
        }
    }
}

/// Build the artifact store selected by `config`.
pub async fn build_artifact_store(
    config: &StorageConfig,
) -> Result<Arc<dyn ArtifactStore>, StorageError> {
    let store: Arc<dyn ArtifactStore> = match config {
        StorageConfig::Local {
            dir,
            public_base_url,
        } => {
            tokio::fs::create_dir_all(dir).await?;
            Arc::new(LocalArtifactStore::new(dir.clone(), public_base_url.clone())?)
        }
        StorageConfig::S3 {
            bucket,
            prefix,
            public_base_url,
        } => Arc::new(
            S3ArtifactStore::from_env(bucket.clone(), prefix.clone(), public_base_url.clone())
                .await?,
        ),
        StorageConfig::Memory { public_base_url } => {
            Arc::new(MemoryArtifactStore::new(public_base_url.clone())?)
        }
    };
    Ok(store)
}
