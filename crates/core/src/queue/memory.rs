//! In-process job queue backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use super::{ClaimedJob, JobOutcome, JobPayload, JobQueue, JobState, QueueError};

struct JobEntry {
    state: JobState,
    /// Present until the job is claimed.
    payload: Option<JobPayload>,
}

/// Queue backed by an in-process channel and a state table.
///
/// Delivery scope is the process lifetime: a worker crash takes the queue
/// with it, so redelivery across restarts needs a durable backend behind
/// the same trait. State transitions follow the contract exactly,
/// including idempotent terminal reports.
pub struct MemoryJobQueue {
    entries: Mutex<HashMap<String, JobEntry>>,
    tx: mpsc::UnboundedSender<String>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            entries: Mutex::new(HashMap::new()),
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl Default for MemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, payload: JobPayload) -> Result<String, QueueError> {
        let job_id = uuid::Uuid::new_v4().to_string();

        {
            let mut entries = self.entries.lock().await;
            entries.insert(
                job_id.clone(),
                JobEntry {
                    state: JobState::Pending,
                    payload: Some(payload),
                },
            );
        }

        self.tx
            .send(job_id.clone())
            .map_err(|_| QueueError::Closed)?;

        Ok(job_id)
    }

    async fn claim(&self) -> Result<ClaimedJob, QueueError> {
        // The receiver lock also serializes claimers, so no two workers
        // can take the same job.
        let mut rx = self.rx.lock().await;

        loop {
            let job_id = rx.recv().await.ok_or(QueueError::Closed)?;

            let mut entries = self.entries.lock().await;
            if let Some(entry) = entries.get_mut(&job_id) {
                if let Some(payload) = entry.payload.take() {
                    entry.state = JobState::Started;
                    return Ok(ClaimedJob { job_id, payload });
                }
            }
            // Entry vanished or was already claimed; keep draining.
        }
    }

    async fn report(&self, job_id: &str, outcome: JobOutcome) -> Result<(), QueueError> {
        let mut entries = self.entries.lock().await;

        let entry = entries
            .get_mut(job_id)
            .ok_or_else(|| QueueError::UnknownJob(job_id.to_string()))?;

        if entry.state.is_terminal() {
            warn!(
                %job_id,
                state = ?entry.state,
                "duplicate terminal report ignored"
            );
            return Ok(());
        }

        entry.state = outcome.into();
        Ok(())
    }

    async fn query(&self, job_id: &str) -> Option<JobState> {
        self.entries.lock().await.get(job_id).map(|e| e.state)
    }
}
