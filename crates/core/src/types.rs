use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::JobState;

/// Opaque job identifier (32 lowercase hex characters).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh job identifier. Identifiers are never reused.
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4().simple().to_string()
}

// ---------------------------------------------------------------------------
// Stage results
// ---------------------------------------------------------------------------

/// Output of the prompt cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCleanResult {
    /// Human-readable cleaned prompt.
    pub cleaned_prompt: String,
    /// Prompt rewritten for the image model.
    pub dalle_prompt: String,
}

/// Output of the image generation stage. URLs are in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerateResult {
    pub images: Vec<String>,
    /// Prompts as rewritten by the image provider, when it reports them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revised_prompts: Vec<String>,
}

/// Reference to a produced 3D asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelGenerateResult {
    /// Provider-hosted URL of the GLB.
    pub model_url: String,
    /// Name of the locally stored copy, served under `/download/`.
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
}

/// Which image(s) the model stage receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Single(String),
    Multiple(Vec<String>),
}

impl ImageInput {
    /// All image URLs carried by this input, in order.
    pub fn urls(&self) -> Vec<&str> {
        match self {
            ImageInput::Single(url) => vec![url.as_str()],
            ImageInput::Multiple(urls) => urls.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ImageInput::Multiple(_))
    }
}

// ---------------------------------------------------------------------------
// Pipeline result and job status
// ---------------------------------------------------------------------------

/// Aggregate result of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job_id: JobId,
    pub status: String,
    pub original_prompt: String,
    pub cleaned_prompt: String,
    pub dalle_prompt: String,
    pub image_urls: Vec<String>,
    pub model_url: String,
    pub model_file: String,
    pub download_url: String,
    /// Wall-clock seconds from start to finish. Zero for async runs.
    pub total_time: f64,
    /// Stage timing key -> seconds. Empty for async runs.
    pub stages: BTreeMap<String, f64>,
}

/// Polled status record of an async pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub status: JobState,
    /// Coarse stage indicator: 0, 10, 30, 60 or 100.
    pub progress: u8,
    pub message: String,
    /// Present only once the job has completed.
    pub result: Option<PipelineResult>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobStatus {
    /// A freshly accepted job: `pending`, progress 0.
    pub fn pending(job_id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            job_id,
            status: JobState::Pending,
            progress: JobState::Pending.progress(),
            message: JobState::Pending.default_message().to_string(),
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}
