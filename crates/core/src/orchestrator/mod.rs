//! API-facing task orchestration.
//!
//! The orchestrator validates and enqueues uploads, and answers status,
//! history and download requests by merging queue state with the durable
//! task rows. It owns no job execution; that is the worker's side of the
//! contract.

mod service;
mod types;

pub use service::TaskOrchestrator;
pub use types::{JobStatus, UploadFile, UploadOutcome};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Archive error: {0}")]
    Archive(String),
}
