use std::collections::HashMap;

use serde::Serialize;

use crate::queue::JobState;

/// One uploaded file handed to `submit`.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Aggregate result of a batch upload.
///
/// Every submitted file lands in exactly one of the two lists; files in
/// `success_files` have a matching entry in `job_ids`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub success_files: Vec<String>,
    pub failed_files: Vec<String>,
    /// filename → job id for everything that was enqueued.
    pub job_ids: HashMap<String, String>,
    pub message: String,
}

/// Answer to a status poll.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub job_id: String,
    pub status: JobState,
    /// Storage keys of all artifacts, populated only on success.
    pub image_links: Vec<String>,
}
