//! Filesystem-backed artifact store.
//!
//! Objects are written under a root directory and served by the API's
//! static file route, so the returned URL is `{public_base_url}/{key}`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::keys::{public_url, validate_key};
use crate::{remote, ArtifactStore, StorageError};

pub struct LocalArtifactStore {
    root: PathBuf,
    public_base_url: String,
    http: reqwest::Client,
}

impl LocalArtifactStore {
    /// * `root`            - directory objects are written under.
    /// * `public_base_url` - URL prefix the directory is served from.
    pub fn new(root: impl Into<PathBuf>, public_base_url: String) -> Result<Self, StorageError> {
        Ok(Self {
            root: root.into(),
            public_base_url,
            http: remote::build_client()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(key, size = bytes.len(), "Stored artifact on local disk");
        Ok(public_url(&self.public_base_url, key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
