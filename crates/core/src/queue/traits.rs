use async_trait::async_trait;

use super::{ClaimedJob, JobOutcome, JobPayload, JobState, QueueError};

/// Trait for job queue backends.
///
/// Contract:
/// - `enqueue` assigns and returns a unique job id immediately, Pending.
/// - `claim` blocks until a job is available; exactly one worker receives
///   a given job, which moves to Started.
/// - `report` records the terminal state. It is idempotent: a second
///   report for the same job never overwrites the first outcome.
/// - No ordering guarantee exists across distinct job ids.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a payload, returning the new job id.
    async fn enqueue(&self, payload: JobPayload) -> Result<String, QueueError>;

    /// Take ownership of the next available job.
    async fn claim(&self) -> Result<ClaimedJob, QueueError>;

    /// Report the terminal outcome of a claimed job.
    async fn report(&self, job_id: &str, outcome: JobOutcome) -> Result<(), QueueError>;

    /// Current state of a job, or `None` if the id was never enqueued.
    async fn query(&self, job_id: &str) -> Option<JobState>;
}
