//! Durable-delivery job queue abstraction.
//!
//! The queue owns the operational job state machine
//! (Pending → Started → Success | Failure); the durable task rows live in
//! the task store. Delivery is at-least-once: a job is acknowledged only
//! by a terminal report, so whatever the backend redelivers after a lost
//! worker is attempted again.

mod memory;
mod traits;
mod types;

pub use memory::MemoryJobQueue;
pub use traits::JobQueue;
pub use types::{ClaimedJob, JobOutcome, JobPayload, JobState};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Queue is closed")]
    Closed,

    #[error("Queue backend error: {0}")]
    Backend(String),
}
