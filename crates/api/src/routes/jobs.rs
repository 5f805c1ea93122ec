//! Route definitions for async job polling.

use axum::routing::get;
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// GET    /job/{job_id}    -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/job/{job_id}", get(jobs::get_job))
}
