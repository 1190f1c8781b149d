//! Durable artifact storage.
//!
//! [`ArtifactStore`] persists uploaded photos, promoted generation outputs
//! and the gallery index. Implementations: [`s3::S3ArtifactStore`],
//! [`local::LocalArtifactStore`] and [`memory::MemoryArtifactStore`].

pub mod keys;
pub mod local;
pub mod memory;
pub mod remote;
pub mod s3;

use async_trait::async_trait;

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Fetching a remote artifact failed at the HTTP level.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote artifact host returned a non-2xx status code.
    #[error("Remote artifact fetch returned HTTP {status} for {url}")]
    RemoteStatus { status: u16, url: String },

    /// The object is larger than the store accepts.
    #[error("Artifact too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    /// The key would escape the store namespace.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

/// Durable object storage addressed by string keys.
///
/// Every write returns the public URL the stored object is served from.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// HTTP client used by [`put_remote`](Self::put_remote).
    fn http_client(&self) -> &reqwest::Client;

    /// Store `bytes` under `key`, overwriting any previous object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;

    /// Read the object under `key`, or `None` if it does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Copy a remote artifact into the store and return its persisted URL.
    ///
    /// The key is derived from the source URL, so promoting the same
    /// artifact twice overwrites one object instead of creating two.
    async fn put_remote(&self, url: &str) -> Result<String, StorageError> {
        let object = remote::download(self.http_client(), url).await?;
        let key = keys::promoted_key(url, &object.content_type);
        self.put(&key, object.bytes, &object.content_type).await
    }
}
