//! Short-poll completion tracking for a batch of generation jobs.
//!
//! [`BatchTracker::await_completion`] polls every still-pending job once
//! per round (concurrently), feeds the responses through the pure
//! [`BatchRequest`] step function, and sleeps between rounds until every
//! job is terminal or the attempt budget is spent. Query errors never
//! fail the batch; the job is simply polled again next round.

use std::time::Duration;

use atelier_core::error::CoreError;
use atelier_core::job::{BatchRequest, BatchResult, RoundProgress, StatusObservation};
use atelier_core::types::JobId;
use atelier_storage::ArtifactStore;
use futures::future::join_all;

use crate::promotion::{promote_artifacts, PromotionPolicy};
use crate::provider::JobStatusProvider;

/// Default number of polling rounds (60 x 5 s = 5 minutes).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
/// Default delay between polling rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Upper bound on polling rounds. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay between rounds.
    pub poll_interval: Duration,
    /// Which successful artifacts to copy into durable storage.
    pub promotion: PromotionPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            promotion: PromotionPolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Worst-case time spent sleeping between rounds. Saturates at
    /// [`Duration::MAX`] instead of overflowing.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval
            .saturating_mul(self.max_attempts.max(1).saturating_sub(1))
    }
}

/// Drives one batch of submitted jobs to completion or timeout.
pub struct BatchTracker<'a, P: ?Sized> {
    provider: &'a P,
    store: Option<&'a dyn ArtifactStore>,
    config: TrackerConfig,
}

impl<'a, P> BatchTracker<'a, P>
where
    P: JobStatusProvider + ?Sized,
{
    pub fn new(provider: &'a P, config: TrackerConfig) -> Self {
        Self {
            provider,
            store: None,
            config,
        }
    }

    /// Promote successful artifacts into `store` once tracking ends.
    pub fn with_store(mut self, store: &'a dyn ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Poll until every job is terminal or the attempt budget runs out.
    pub async fn await_completion(&self, ids: Vec<JobId>) -> Result<BatchResult, CoreError> {
        self.await_completion_with(ids, |_| {}).await
    }

    /// Same as [`await_completion`](Self::await_completion), calling
    /// `on_round` after every polling round.
    pub async fn await_completion_with<F>(
        &self,
        ids: Vec<JobId>,
        mut on_round: F,
    ) -> Result<BatchResult, CoreError>
    where
        F: FnMut(&RoundProgress) + Send,
    {
        let mut batch = BatchRequest::new(ids)?;
        let max_attempts = self.config.max_attempts.max(1);

        loop {
            let pending = batch.pending_ids();
            let observations = join_all(pending.into_iter().map(|id| self.observe(id))).await;

            let progress = batch.apply_round(observations);
            tracing::debug!(
                attempt = progress.attempt,
                max_attempts,
                pending = progress.pending,
                succeeded = progress.succeeded,
                failed = progress.failed,
                "Polling round complete",
            );
            on_round(&progress);

            if batch.is_settled() || batch.attempts() >= max_attempts {
                break;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        let mut result = batch.finish();
        if result.timed_out {
            tracing::warn!(
                attempts = result.attempts,
                pending = result.pending.len(),
                "Batch polling budget exhausted",
            );
        }

        if let Some(store) = self.store {
            promote_artifacts(store, &mut result, self.config.promotion).await;
        }

        Ok(result)
    }

    /// Query one job, downgrading any error to [`StatusObservation::Unreachable`].
    async fn observe(&self, id: JobId) -> (JobId, StatusObservation) {
        match self.provider.job_status(&id).await {
            Ok(status) => (id, status.observation()),
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "Status query failed, retrying next round");
                (id, StatusObservation::Unreachable)
            }
        }
    }
}
