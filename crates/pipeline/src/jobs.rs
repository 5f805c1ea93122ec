//! In-memory registry of async pipeline jobs.
//!
//! Created once at startup and shared behind an `Arc`. Entries are never
//! evicted; they live as long as the process. Only the background task that
//! owns a job mutates its entry after creation.

use std::collections::HashMap;

use delta_core::error::CoreError;
use delta_core::pipeline::JobState;
use delta_core::types::{JobId, JobStatus, PipelineResult};
use tokio::sync::RwLock;

/// Keyed store of [`JobStatus`] records.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobStatus>>,
}

impl JobRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the record for `job_id`.
    pub async fn put(&self, job_id: JobId, status: JobStatus) {
        self.jobs.write().await.insert(job_id, status);
    }

    /// Snapshot of the record for `job_id`.
    pub async fn get(&self, job_id: &str) -> Result<JobStatus, CoreError> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Job",
                id: job_id.to_string(),
            })
    }

    /// Number of jobs tracked since startup.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Number of jobs not yet completed or failed.
    pub async fn in_flight(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|s| !s.status.is_terminal())
            .count()
    }

    /// Move a job into a running stage state with its default progress and
    /// message.
    pub async fn advance(&self, job_id: &str, to: JobState) -> Result<(), CoreError> {
        self.transition(job_id, to, |status| {
            status.message = to.default_message().to_string();
        })
        .await
    }

    /// Mark a job completed and attach its result.
    pub async fn complete(&self, job_id: &str, result: PipelineResult) -> Result<(), CoreError> {
        self.transition(job_id, JobState::Completed, |status| {
            status.message = JobState::Completed.default_message().to_string();
            status.result = Some(result);
        })
        .await
    }

    /// Mark a job failed with `message`. No result is attached.
    pub async fn fail(&self, job_id: &str, message: String) -> Result<(), CoreError> {
        self.transition(job_id, JobState::Failed, |status| {
            status.message = message;
            status.result = None;
        })
        .await
    }

    async fn transition(
        &self,
        job_id: &str,
        to: JobState,
        apply: impl FnOnce(&mut JobStatus),
    ) -> Result<(), CoreError> {
        let mut jobs = self.jobs.write().await;
        let status = jobs.get_mut(job_id).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: job_id.to_string(),
        })?;

        status.status.validate_transition(to)?;

        status.status = to;
        status.progress = to.progress();
        status.updated_at = chrono::Utc::now();
        apply(status);
        Ok(())
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
