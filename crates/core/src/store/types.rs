use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user owning image tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Salted password hash, never the plain credential.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// One row per stored image artifact (original or one derivative).
///
/// All rows produced by one upload-transform job share a `job_id`; every
/// job has exactly one row whose storage key carries the `_original`
/// suffix. Rows are immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTask {
    pub id: String,
    pub job_id: String,
    pub storage_key: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new image task row.
#[derive(Debug, Clone)]
pub struct NewImageTask {
    pub job_id: String,
    pub storage_key: String,
    pub owner_id: String,
}

/// Measurements of the original artifact of a job.
///
/// Exactly one statistics row per originating task row; created once,
/// immutable, cascades on delete of its task row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStatistics {
    pub id: String,
    pub task_id: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    /// Wall-clock seconds from start of transform to completion.
    pub processing_time: f64,
}

/// Request to create a new statistics row.
#[derive(Debug, Clone)]
pub struct NewImageStatistics {
    pub task_id: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub processing_time: f64,
}
