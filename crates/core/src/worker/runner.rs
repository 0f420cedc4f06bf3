//! Worker claim loop and per-job processing.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::metrics::{ARTIFACTS_STORED, JOBS_PROCESSED, JOB_DURATION};
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::queue::{ClaimedJob, JobOutcome, JobQueue, QueueError};
use crate::store::{NewImageStatistics, NewImageTask, StoreError, TaskStore};
use crate::transform::{self, TransformError, TransformKind};

/// Error type for a single job attempt. Any of these is fatal to the
/// attempt and surfaces as a Failure report; nothing is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Storage(#[from] ObjectStoreError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// The worker: claims jobs, runs the transform engine, persists artifacts
/// and rows, reports the terminal outcome back to the queue.
pub struct ImageWorker {
    queue: Arc<dyn JobQueue>,
    objects: Arc<dyn ObjectStore>,
    tasks: Arc<dyn TaskStore>,
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ImageWorker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        objects: Arc<dyn ObjectStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            queue,
            objects,
            tasks,
            shutdown_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Start the claim loop. Idempotent; a second call is a no-op.
    pub async fn start(&self) {
        let mut handle_guard = self.handle.lock().await;
        if handle_guard.is_some() {
            warn!("worker already started");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        *self.shutdown_tx.lock().await = Some(shutdown_tx);

        let queue = Arc::clone(&self.queue);
        let objects = Arc::clone(&self.objects);
        let tasks = Arc::clone(&self.tasks);

        let handle = tokio::spawn(async move {
            info!("worker started");
            loop {
                // claim() is not cancellation-safe: a shutdown racing a
                // claim can drop a job the backend already handed over.
                // Redelivery scope is the process lifetime, so a job lost
                // this way dies with the process anyway.
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("worker shutting down");
                        break;
                    }
                    claimed = queue.claim() => {
                        match claimed {
                            Ok(job) => {
                                Self::handle_job(&queue, objects.as_ref(), tasks.as_ref(), job)
                                    .await;
                            }
                            Err(QueueError::Closed) => {
                                info!("queue closed, worker stopping");
                                break;
                            }
                            Err(e) => {
                                error!("claim failed: {}", e);
                            }
                        }
                    }
                }
            }
        });

        *handle_guard = Some(handle);
    }

    /// Stop the claim loop. A job already claimed runs to completion
    /// before the loop observes the shutdown signal.
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
    }

    async fn handle_job(
        queue: &Arc<dyn JobQueue>,
        objects: &dyn ObjectStore,
        tasks: &dyn TaskStore,
        job: ClaimedJob,
    ) {
        let job_id = job.job_id.clone();

        let outcome = match Self::process_job(objects, tasks, &job).await {
            Ok(()) => {
                JOBS_PROCESSED.with_label_values(&["success"]).inc();
                JobOutcome::Success
            }
            Err(e) => {
                error!(%job_id, "job failed: {}", e);
                JOBS_PROCESSED.with_label_values(&["failure"]).inc();
                JobOutcome::Failure
            }
        };

        if let Err(e) = queue.report(&job_id, outcome).await {
            error!(%job_id, "failed to report outcome: {}", e);
        }
    }

    /// Process one claimed job:
    ///
    /// 1. Record the start timestamp.
    /// 2. Persist the original bytes unconditionally and create its row.
    /// 3. Run the engine for a non-original kind; persist the derivative
    ///    and its row when one is produced.
    /// 4. Create the statistics row for the original artifact.
    ///
    /// Errors propagate: if original persistence fails no rows exist; if
    /// derivative persistence fails the original's row and statistics
    /// still stand. No cross-artifact transactionality is promised.
    async fn process_job(
        objects: &dyn ObjectStore,
        tasks: &dyn TaskStore,
        job: &ClaimedJob,
    ) -> Result<(), WorkerError> {
        let started = Instant::now();
        let payload = &job.payload;

        let (image, format) = transform::decode(&payload.bytes)?;
        let ext = transform::format_extension(format);
        let stem = file_stem(&payload.file_name);
        let content_type = format.to_mime_type();

        let original_key = format!("{stem}_original.{ext}");
        objects
            .put(&original_key, payload.bytes.clone(), content_type)
            .await?;
        let original_task = tasks.create_task(NewImageTask {
            job_id: job.job_id.clone(),
            storage_key: original_key,
            owner_id: payload.owner_id.clone(),
        })?;
        ARTIFACTS_STORED.with_label_values(&["original"]).inc();

        if payload.transformation != TransformKind::Original {
            if let Some(derived) = transform::apply(payload.transformation, &image) {
                let suffix = payload.transformation.suffix();
                let derived_key = format!("{stem}_{suffix}.{ext}");
                let derived_bytes = transform::encode(&derived, format)?;

                objects
                    .put(&derived_key, derived_bytes, content_type)
                    .await?;
                tasks.create_task(NewImageTask {
                    job_id: job.job_id.clone(),
                    storage_key: derived_key,
                    owner_id: payload.owner_id.clone(),
                })?;
                ARTIFACTS_STORED.with_label_values(&[suffix]).inc();
            }
        }

        let processing_time = started.elapsed().as_secs_f64();
        tasks.create_statistics(NewImageStatistics {
            task_id: original_task.id,
            width: image.width(),
            height: image.height(),
            size_bytes: payload.bytes.len() as u64,
            processing_time,
        })?;

        JOB_DURATION
            .with_label_values(&[payload.transformation.suffix()])
            .observe(processing_time);

        info!(
            job_id = %job.job_id,
            transformation = %payload.transformation,
            elapsed_secs = processing_time,
            "job completed"
        );

        Ok(())
    }
}

/// Filename without its final extension; the whole name if it has none.
fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}
