//! Best-effort promotion of provider-hosted artifacts into durable storage.
//!
//! Provider output URLs may expire. After a batch resolves, selected
//! artifacts are copied into the [`ArtifactStore`] with a single attempt
//! each; a failed copy logs a warning and keeps the original URL.

use std::fmt;
use std::str::FromStr;

use atelier_core::error::CoreError;
use atelier_core::job::BatchResult;
use atelier_storage::ArtifactStore;
use futures::future::join_all;

/// Which successful artifacts get copied into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionPolicy {
    /// Keep provider URLs as-is.
    None,
    /// Copy only the first successful artifact (submission order).
    #[default]
    First,
    /// Copy every successful artifact.
    All,
}

impl PromotionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::First => "first",
            Self::All => "all",
        }
    }

    fn limit(&self, succeeded: usize) -> usize {
        match self {
            Self::None => 0,
            Self::First => succeeded.min(1),
            Self::All => succeeded,
        }
    }
}

impl fmt::Display for PromotionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "first" => Ok(Self::First),
            "all" => Ok(Self::All),
            other => Err(CoreError::Validation(format!(
                "Invalid promotion policy '{other}'. Must be one of: none, first, all"
            ))),
        }
    }
}

/// Copy one artifact, falling back to `url` on any error.
pub async fn promote_one(store: &dyn ArtifactStore, url: &str) -> String {
    match store.put_remote(url).await {
        Ok(persisted) => {
            tracing::info!(source = url, persisted = %persisted, "Artifact promoted");
            persisted
        }
        Err(e) => {
            tracing::warn!(
                source = url,
                backend = store.backend_name(),
                error = %e,
                "Artifact promotion failed, keeping provider URL",
            );
            url.to_string()
        }
    }
}

/// Promote the artifacts selected by `policy`, rewriting their URLs in
/// place. Returns how many were actually persisted.
pub async fn promote_artifacts(
    store: &dyn ArtifactStore,
    result: &mut BatchResult,
    policy: PromotionPolicy,
) -> usize {
    let limit = policy.limit(result.succeeded.len());
    if limit == 0 {
        return 0;
    }

    let selected = &mut result.succeeded[..limit];
    let promoted = join_all(
        selected
            .iter()
            .map(|job| promote_one(store, &job.artifact_url)),
    )
    .await;

    let mut persisted = 0;
    for (job, url) in selected.iter_mut().zip(promoted) {
        if url != job.artifact_url {
            persisted += 1;
        }
        job.artifact_url = url;
    }
    persisted
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use atelier_core::job::CompletedJob;
    use atelier_core::types::JobId;
    use atelier_storage::StorageError;

    use super::*;

    /// Store whose `put_remote` either rewrites the host or always fails.
    struct FakeStore {
        http: reqwest::Client,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeStore {
        fn new(fail: bool) -> Self {
            Self {
                http: reqwest::Client::new(),
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ArtifactStore for FakeStore {
        fn backend_name(&self) -> &'static str {
            "fake"
        }

        fn http_client(&self) -> &reqwest::Client {
            &self.http
        }

        async fn put(&self, key: &str, _: Vec<u8>, _: &str) -> Result<String, StorageError> {
            Ok(format!("https://store.test/{key}"))
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        async fn put_remote(&self, url: &str) -> Result<String, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::S3("bucket unavailable".into()));
            }
            Ok(url.replace("https://provider.test", "https://store.test"))
        }
    }

    fn result_with(urls: &[&str]) -> BatchResult {
        BatchResult {
            succeeded: urls
                .iter()
                .enumerate()
                .map(|(i, url)| CompletedJob {
                    id: JobId::new(format!("job-{i}")),
                    artifact_url: url.to_string(),
                })
                .collect(),
            failed: Vec::new(),
            pending: Vec::new(),
            timed_out: false,
            attempts: 1,
        }
    }

    #[test]
    fn policy_parses() {
        assert_eq!("ALL".parse::<PromotionPolicy>().unwrap(), PromotionPolicy::All);
        assert_eq!("none".parse::<PromotionPolicy>().unwrap(), PromotionPolicy::None);
        assert!("some".parse::<PromotionPolicy>().is_err());
        assert_eq!(PromotionPolicy::default(), PromotionPolicy::First);
    }

    #[tokio::test]
    async fn successful_promotion_uses_store_url() {
        let store = FakeStore::new(false);
        let mut result = result_with(&["https://provider.test/x.png"]);

        let count = promote_artifacts(&store, &mut result, PromotionPolicy::First).await;

        assert_eq!(count, 1);
        assert_eq!(result.succeeded[0].artifact_url, "https://store.test/x.png");
    }

    #[tokio::test]
    async fn failed_promotion_keeps_original_url() {
        let store = FakeStore::new(true);
        let mut result = result_with(&["https://provider.test/x.png"]);

        let count = promote_artifacts(&store, &mut result, PromotionPolicy::All).await;

        assert_eq!(count, 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.succeeded[0].artifact_url, "https://provider.test/x.png");
    }

    #[tokio::test]
    async fn first_policy_only_touches_first_artifact() {
        let store = FakeStore::new(false);
        let mut result = result_with(&["https://provider.test/a.png", "https://provider.test/b.png"]);

        promote_artifacts(&store, &mut result, PromotionPolicy::First).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.succeeded[0].artifact_url, "https://store.test/a.png");
        assert_eq!(result.succeeded[1].artifact_url, "https://provider.test/b.png");
    }

    #[tokio::test]
    async fn all_policy_touches_every_artifact() {
        let store = FakeStore::new(false);
        let mut result = result_with(&["https://provider.test/a.png", "https://provider.test/b.png"]);

        let count = promote_artifacts(&store, &mut result, PromotionPolicy::All).await;

        assert_eq!(count, 2);
        assert_eq!(result.succeeded[1].artifact_url, "https://store.test/b.png");
    }

    #[tokio::test]
    async fn none_policy_is_a_no_op() {
        let store = FakeStore::new(false);
        let mut result = result_with(&["https://provider.test/a.png"]);

        assert_eq!(promote_artifacts(&store, &mut result, PromotionPolicy::None).await, 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
}
