//! Handlers for async job polling.

use axum::extract::{Path, State};
use axum::Json;
use delta_core::types::JobStatus;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /job/{job_id}
///
/// Snapshot of an async job. Reading has no side effects; 404 for ids that
/// were never issued.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatus>> {
    let status = state.pipeline.jobs().get(&job_id).await?;
    Ok(Json(status))
}
