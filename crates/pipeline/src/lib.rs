//! Pipeline orchestration and async job tracking.

pub mod jobs;
pub mod orchestrator;

pub use jobs::JobRegistry;
pub use orchestrator::{Pipeline, StartedJob};
