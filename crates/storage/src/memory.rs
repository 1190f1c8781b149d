//! In-process artifact store.
//!
//! Nothing survives a restart. Used by tests and by `STORAGE_BACKEND=memory`
//! for local experiments without disk or S3 access.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::keys::{public_url, validate_key};
use crate::{remote, ArtifactStore, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryArtifactStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    public_base_url: String,
    http: reqwest::Client,
}

impl MemoryArtifactStore {
    pub fn new(public_base_url: String) -> Result<Self, StorageError> {
        Ok(Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url,
            http: remote::build_client()?,
        })
    }

    /// Snapshot of one stored object, including its content type.
    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.public_base_url, key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|object| object.bytes.clone()))
    }
}
