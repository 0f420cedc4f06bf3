//! Orchestrator operations: submit, status, history, download.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;

use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::object_store::ObjectStore;
use crate::queue::{JobPayload, JobQueue, JobState};
use crate::store::{ImageTask, TaskStore};
use crate::transform::TransformKind;

use super::{JobStatus, OrchestratorError, UploadFile, UploadOutcome};

/// Extensions accepted for upload, compared case-insensitively.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const ALL_PROCESSED_MESSAGE: &str = "All files processed successfully.";
const SOME_UNSUPPORTED_MESSAGE: &str =
    "Some files were not processed due to unsupported formats.";

/// Facade over the job queue, task store and object store answering the
/// client-facing operations.
pub struct TaskOrchestrator {
    queue: Arc<dyn JobQueue>,
    tasks: Arc<dyn TaskStore>,
    objects: Arc<dyn ObjectStore>,
}

impl TaskOrchestrator {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        tasks: Arc<dyn TaskStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            queue,
            tasks,
            objects,
        }
    }

    /// Validate and enqueue a batch of uploads, one job per valid file.
    ///
    /// Files with a disallowed extension land in `failed_files` without
    /// aborting the batch.
    pub async fn submit(
        &self,
        files: Vec<UploadFile>,
        transformation: TransformKind,
        owner_id: &str,
    ) -> Result<UploadOutcome, OrchestratorError> {
        let mut success_files = Vec::new();
        let mut failed_files = Vec::new();
        let mut job_ids = HashMap::new();

        for file in files {
            if !has_allowed_extension(&file.name) {
                failed_files.push(file.name);
                continue;
            }

            let job_id = self
                .queue
                .enqueue(JobPayload {
                    file_name: file.name.clone(),
                    bytes: file.bytes,
                    transformation,
                    owner_id: owner_id.to_string(),
                })
                .await?;

            info!(%job_id, file_name = %file.name, %transformation, "enqueued job");
            job_ids.insert(file.name.clone(), job_id);
            success_files.push(file.name);
        }

        let message = if failed_files.is_empty() {
            ALL_PROCESSED_MESSAGE.to_string()
        } else {
            SOME_UNSUPPORTED_MESSAGE.to_string()
        };

        Ok(UploadOutcome {
            success_files,
            failed_files,
            job_ids,
            message,
        })
    }

    /// Queue state for a job, with artifact links once it has succeeded.
    ///
    /// A Pending job is reported as not found: a never-submitted id and a
    /// queued-but-unstarted one are indistinguishable to the caller.
    pub async fn status(&self, job_id: &str) -> Result<JobStatus, OrchestratorError> {
        let state = match self.queue.query(job_id).await {
            None | Some(JobState::Pending) => {
                return Err(OrchestratorError::NotFound(format!("task {job_id}")))
            }
            Some(state) => state,
        };

        let image_links = if state == JobState::Success {
            self.tasks
                .tasks_by_job(job_id)?
                .into_iter()
                .map(|t| t.storage_key)
                .collect()
        } else {
            Vec::new()
        };

        Ok(JobStatus {
            job_id: job_id.to_string(),
            status: state,
            image_links,
        })
    }

    /// All task rows of a user, ordered by creation.
    ///
    /// Callers may only read their own history. An empty history is a
    /// not-found error rather than an empty list.
    pub async fn history(
        &self,
        user_id: &str,
        caller_id: &str,
    ) -> Result<Vec<ImageTask>, OrchestratorError> {
        if user_id != caller_id {
            return Err(OrchestratorError::Forbidden);
        }

        let tasks = self.tasks.tasks_by_owner(user_id)?;
        if tasks.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "no tasks for user {user_id}"
            )));
        }

        Ok(tasks)
    }

    /// Bundle all artifacts of a job into a zip archive.
    ///
    /// The archive is assembled entirely in memory; artifacts that fail
    /// to fetch are skipped with a warning rather than aborting the
    /// download.
    pub async fn download(
        &self,
        job_id: &str,
        caller_id: &str,
    ) -> Result<Vec<u8>, OrchestratorError> {
        let tasks = self.tasks.tasks_by_job(job_id)?;
        let first = tasks
            .first()
            .ok_or_else(|| OrchestratorError::NotFound(format!("task {job_id}")))?;

        // All rows of a job share one owner, enforced at write time.
        if first.owner_id != caller_id {
            return Err(OrchestratorError::Forbidden);
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for task in &tasks {
            let bytes = match self.objects.get(&task.storage_key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        %job_id,
                        storage_key = %task.storage_key,
                        "skipping unfetchable artifact: {}",
                        e
                    );
                    continue;
                }
            };

            let entry_name = task
                .storage_key
                .rsplit('/')
                .next()
                .unwrap_or(&task.storage_key);
            writer
                .start_file(entry_name, options)
                .map_err(|e| OrchestratorError::Archive(e.to_string()))?;
            writer
                .write_all(&bytes)
                .map_err(|e| OrchestratorError::Archive(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| OrchestratorError::Archive(e.to_string()))?;

        Ok(cursor.into_inner())
    }
}

fn has_allowed_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
