//! Axum route handlers for the CV screening API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::cv_match::CvMatchRow;
use crate::screening::pipeline::{screen_batch, validate_batch_size, BatchResponse, UploadedDocument};
use crate::state::AppState;

/// Multipart field carrying one CV per part.
const CV_FIELD: &str = "cvs";

/// POST /api/v1/jobs/:job_id/process-cvs
///
/// Screens every `cvs` part of the upload against the job's requirements.
/// Oversized batches are rejected while reading, before any CV is processed.
pub async fn handle_process_cvs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let config = state.config.batch_config();

    let mut documents = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(CV_FIELD) {
            continue;
        }
        validate_batch_size(documents.len() + 1, config.max_batch_size)?;

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("cv-{}", documents.len() + 1));
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await?;

        documents.push(UploadedDocument {
            file_name,
            content_type,
            content,
        });
    }

    let response = screen_batch(
        state.store.as_ref(),
        &state.vocabulary,
        &job_id,
        documents,
        &config,
    )
    .await?;

    Ok(Json(response))
}

/// GET /api/v1/jobs/:job_id/cv-matches
///
/// Persisted match records for a job, highest score first.
pub async fn handle_list_cv_matches(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<CvMatchRow>>, AppError> {
    state
        .store
        .get_job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let records = state.store.list_match_records(&job_id).await?;
    Ok(Json(records))
}
