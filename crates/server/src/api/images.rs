//! Upload, status, history and download endpoints.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use darkroom_core::{
    ImageTask, JobStatus, OrchestratorError, TransformKind, UploadFile, UploadOutcome,
};

use super::auth::ErrorResponse;
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub tasks: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub job_id: String,
    pub storage_key: String,
    pub owner_id: String,
    pub created_at: String,
}

impl From<ImageTask> for HistoryEntry {
    fn from(task: ImageTask) -> Self {
        Self {
            id: task.id,
            job_id: task.job_id,
            storage_key: task.storage_key,
            owner_id: task.owner_id,
            created_at: task.created_at.to_rfc3339(),
        }
    }
}

fn error_response(status: StatusCode, detail: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

fn map_orchestrator_error(e: OrchestratorError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        OrchestratorError::NotFound(detail) => error_response(StatusCode::NOT_FOUND, &detail),
        OrchestratorError::Forbidden => {
            error_response(StatusCode::FORBIDDEN, "Access denied")
        }
        other => {
            warn!("request failed: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Accept a multipart batch of files plus a `transformation` field and
/// enqueue one job per valid file.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let mut files = Vec::new();
    let mut transformation: Option<TransformKind> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, &format!("Malformed multipart: {e}"))
    })? {
        match field.name() {
            Some("files") => {
                let name = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        &format!("Failed to read file: {e}"),
                    )
                })?;
                files.push(UploadFile {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("transformation") => {
                let value = field.text().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        &format!("Failed to read field: {e}"),
                    )
                })?;
                transformation = Some(value.parse().map_err(|_| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        &format!("Unknown transformation: {value}"),
                    )
                })?);
            }
            _ => {}
        }
    }

    let transformation = transformation.ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "Missing transformation field")
    })?;
    if files.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "No files provided"));
    }

    let outcome = state
        .orchestrator()
        .submit(files, transformation, &user_id)
        .await
        .map_err(map_orchestrator_error)?;

    Ok(Json(outcome))
}

/// Poll the state of a job. Pending and unknown jobs are both a 404.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatus>, (StatusCode, Json<ErrorResponse>)> {
    let status = state
        .orchestrator()
        .status(&job_id)
        .await
        .map_err(map_orchestrator_error)?;
    Ok(Json(status))
}

/// All task rows of a user. Callers may only read their own history.
pub async fn history(
    State(state): State<Arc<AppState>>,
    AuthUser(caller_id): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tasks = state
        .orchestrator()
        .history(&user_id, &caller_id)
        .await
        .map_err(map_orchestrator_error)?;
    Ok(Json(HistoryResponse {
        user_id,
        tasks: tasks.into_iter().map(HistoryEntry::from).collect(),
    }))
}

/// Download all artifacts of a job as a zip archive.
pub async fn download(
    State(state): State<Arc<AppState>>,
    AuthUser(caller_id): AuthUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let archive = state
        .orchestrator()
        .download(&job_id, &caller_id)
        .await
        .map_err(map_orchestrator_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{job_id}.zip\""),
            ),
        ],
        archive,
    ))
}
