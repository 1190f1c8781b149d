//! Download helper for promoting provider-hosted artifacts.

use std::time::Duration;

use crate::StorageError;

/// Largest artifact accepted from a remote host (50 MiB).
pub const MAX_REMOTE_BYTES: u64 = 50 * 1024 * 1024;

/// HTTP timeout for a single artifact download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// A downloaded artifact.
#[derive(Debug)]
pub struct RemoteObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Build the HTTP client shared by the store implementations.
pub fn build_client() -> Result<reqwest::Client, StorageError> {
    Ok(reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?)
}

/// Fetch `url` fully into memory, refusing bodies over [`MAX_REMOTE_BYTES`].
pub async fn download(client: &reqwest::Client, url: &str) -> Result<RemoteObject, StorageError> {
    download_capped(client, url, MAX_REMOTE_BYTES).await
}

async fn download_capped(
    client: &reqwest::Client,
    url: &str,
    max: u64,
) -> Result<RemoteObject, StorageError> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StorageError::RemoteStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if let Some(size) = response.content_length() {
        if size > max {
            return Err(StorageError::TooLarge { size, max });
        }
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    // Content-Length may be absent or wrong, so count while streaming.
    // `size` in the error is what arrived before the read stopped.
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let size = (bytes.len() + chunk.len()) as u64;
        if size > max {
            return Err(StorageError::TooLarge { size, max });
        }
        bytes.extend_from_slice(&chunk);
    }

    tracing::debug!(url, size = bytes.len(), %content_type, "Downloaded remote artifact");

    Ok(RemoteObject {
        bytes,
        content_type,
    })
}
