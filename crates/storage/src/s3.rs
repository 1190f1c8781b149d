//! S3-backed artifact store.
//!
//! Credentials and region come from the standard AWS environment
//! (`AWS_ACCESS_KEY_ID`, `AWS_REGION`, profiles, instance metadata).
//! Objects are expected to be publicly readable through
//! `public_base_url` (bucket website, CDN, or path-style endpoint).

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::keys::{public_url, validate_key};
use crate::{remote, ArtifactStore, StorageError};

pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: Option<String>,
    public_base_url: String,
    http: reqwest::Client,
}

impl S3ArtifactStore {
    /// Build a store from an existing S3 client.
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: String,
        prefix: Option<String>,
        public_base_url: String,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            client,
            bucket,
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            public_base_url,
            http: remote::build_client()?,
        })
    }

    /// Build a store using credentials from the AWS environment.
    pub async fn from_env(
        bucket: String,
        prefix: Option<String>,
        public_base_url: String,
    ) -> Result<Self, StorageError> {
        let sdk_config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        tracing::info!(%bucket, "S3 artifact store configured");
        Self::new(client, bucket, prefix, public_base_url)
    }

    /// Full object key including the optional prefix.
    fn object_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    fn backend_name(&self) -> &'static str {
        "s3"
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
        let object_key = self.object_key(key);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %object_key, size, "Stored artifact in S3");
        Ok(public_url(&self.public_base_url, &object_key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let object_key = self.object_key(key);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    return Ok(None);
                }
                return Err(StorageError::S3(DisplayErrorContext(err).to_string()));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(Some(data.into_bytes().to_vec()))
    }
}
