//! Generation job state machine and batch step function.
//!
//! A [`BatchRequest`] holds one [`GenerationJob`] per submitted job ID.
//! Each job moves `Pending -> Succeeded | Failed` exactly once; terminal
//! jobs ignore every later observation. The async polling driver lives in
//! `atelier-provider`; everything here is pure so a polling run can be
//! replayed from canned observations.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::JobId;

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Lifecycle state of a single generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Succeeded { artifact_url: String },
    Failed { reason: Option<String> },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One unit of requested generation work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationJob {
    pub id: JobId,
    #[serde(flatten)]
    pub state: JobState,
}

/// What a single status query reported for a job during one round.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusObservation {
    /// Queued, starting or processing.
    InProgress,
    /// The provider reported success. A success without an artifact URL
    /// is not terminal yet; the job stays pending.
    Succeeded { artifact_url: Option<String> },
    Failed { reason: Option<String> },
    /// The status query itself failed (network error, 5xx, bad body).
    Unreachable,
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Snapshot emitted after every polling round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundProgress {
    pub attempt: u32,
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// The set of jobs submitted by one user action, plus the round counter.
///
/// Exclusively owned by the request handler that created it and dropped
/// when that handler returns.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    jobs: Vec<GenerationJob>,
    index: HashMap<JobId, usize>,
    attempts: u32,
}

impl BatchRequest {
    /// Create a batch with every job `Pending`.
    ///
    /// Duplicate IDs are collapsed (first occurrence keeps its position).
    /// An empty input is rejected.
    pub fn new<I>(ids: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = JobId>,
    {
        let mut jobs = Vec::new();
        let mut index = HashMap::new();

        for id in ids {
            if index.contains_key(&id) {
                continue;
            }
            index.insert(id.clone(), jobs.len());
            jobs.push(GenerationJob {
                id,
                state: JobState::Pending,
            });
        }

        if jobs.is_empty() {
            return Err(CoreError::Validation(
                "A batch needs at least one job ID".into(),
            ));
        }

        Ok(Self {
            jobs,
            index,
            attempts: 0,
        })
    }

    pub fn jobs(&self) -> &[GenerationJob] {
        &self.jobs
    }

    /// Number of polling rounds applied so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state_of(&self, id: &JobId) -> Option<&JobState> {
        self.index.get(id).map(|&i| &self.jobs[i].state)
    }

    /// IDs still awaiting a terminal status, in submission order.
    pub fn pending_ids(&self) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|job| !job.state.is_terminal())
            .map(|job| job.id.clone())
            .collect()
    }

    /// `true` once every job is terminal.
    pub fn is_settled(&self) -> bool {
        self.jobs.iter().all(|job| job.state.is_terminal())
    }

    /// Apply one round of observations and advance the round counter.
    ///
    /// Observations for unknown IDs or for jobs that are already
    /// terminal are ignored.
    pub fn apply_round<I>(&mut self, observations: I) -> RoundProgress
    where
        I: IntoIterator<Item = (JobId, StatusObservation)>,
    {
        self.attempts += 1;

        for (id, observation) in observations {
            let Some(&i) = self.index.get(&id) else {
                continue;
            };
            let job = &mut self.jobs[i];
            if job.state.is_terminal() {
                continue;
            }
            job.state = next_state(observation).unwrap_or(JobState::Pending);
        }

        self.progress()
    }

    pub fn progress(&self) -> RoundProgress {
        let mut progress = RoundProgress {
            attempt: self.attempts,
            pending: 0,
            succeeded: 0,
            failed: 0,
        };
        for job in &self.jobs {
            match job.state {
                JobState::Pending => progress.pending += 1,
                JobState::Succeeded { .. } => progress.succeeded += 1,
                JobState::Failed { .. } => progress.failed += 1,
            }
        }
        progress
    }

    /// Consume the batch into its result. Any job still pending marks
    /// the result as timed out.
    pub fn finish(self) -> BatchResult {
        let mut result = BatchResult {
            succeeded: Vec::new(),
            failed: Vec::new(),
            pending: Vec::new(),
            timed_out: false,
            attempts: self.attempts,
        };

        for job in self.jobs {
            match job.state {
                JobState::Pending => result.pending.push(job.id),
                JobState::Succeeded { artifact_url } => result.succeeded.push(CompletedJob {
                    id: job.id,
                    artifact_url,
                }),
                JobState::Failed { reason } => result.failed.push(FailedJob { id: job.id, reason }),
            }
        }
        result.timed_out = !result.pending.is_empty();
        result
    }
}

/// Map an observation of a pending job to its next terminal state, or
/// `None` if the job stays pending.
fn next_state(observation: StatusObservation) -> Option<JobState> {
    match observation {
        StatusObservation::Succeeded {
            artifact_url: Some(url),
        } if !url.is_empty() => Some(JobState::Succeeded { artifact_url: url }),
        StatusObservation::Failed { reason } => Some(JobState::Failed { reason }),
        StatusObservation::Succeeded { .. }
        | StatusObservation::InProgress
        | StatusObservation::Unreachable => None,
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedJob {
    pub id: JobId,
    pub artifact_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedJob {
    pub id: JobId,
    pub reason: Option<String>,
}

/// Final state of a tracked batch. All lists preserve submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<CompletedJob>,
    pub failed: Vec<FailedJob>,
    pub pending: Vec<JobId>,
    pub timed_out: bool,
    pub attempts: u32,
}

impl BatchResult {
    /// Classify the result into a user-visible outcome.
    ///
    /// Any success makes the batch usable even when other jobs failed or
    /// timed out. With no success, a timeout takes precedence over
    /// failure so the user sees "taking too long" rather than "failed".
    pub fn into_outcome(self) -> Result<Self, CoreError> {
        if !self.succeeded.is_empty() {
            return Ok(self);
        }
        if self.timed_out {
            return Err(CoreError::GenerationTimedOut {
                pending: self.pending.len(),
                attempts: self.attempts,
            });
        }
        Err(CoreError::AllGenerationsFailed {
            count: self.failed.len(),
        })
    }
}
