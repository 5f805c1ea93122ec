//! Pipeline stage definitions and the job status state machine.
//!
//! Kept in `core` so the orchestrator, the job registry and the HTTP layer
//! agree on stage names, progress values and allowed transitions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ImageInput;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// One of the three sequential pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PromptCleaning,
    ImageGeneration,
    ModelGeneration,
}

/// Stages in execution order.
pub const STAGE_ORDER: [Stage; 3] = [
    Stage::PromptCleaning,
    Stage::ImageGeneration,
    Stage::ModelGeneration,
];

impl Stage {
    /// Key used in `PipelineResult::stages`.
    pub fn timing_key(self) -> &'static str {
        match self {
            Stage::PromptCleaning => "prompt_cleaning",
            Stage::ImageGeneration => "image_generation",
            Stage::ModelGeneration => "3d_generation",
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Stage::PromptCleaning => "Prompt cleaning",
            Stage::ImageGeneration => "Image generation",
            Stage::ModelGeneration => "3D generation",
        }
    }

    /// Job state entered right before this stage runs.
    pub fn job_state(self) -> JobState {
        match self {
            Stage::PromptCleaning => JobState::CleaningPrompt,
            Stage::ImageGeneration => JobState::GeneratingImages,
            Stage::ModelGeneration => JobState::Generating3d,
        }
    }
}

// ---------------------------------------------------------------------------
// Job state machine
// ---------------------------------------------------------------------------

/// Status of an async pipeline job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    CleaningPrompt,
    GeneratingImages,
    #[serde(rename = "generating_3d")]
    Generating3d,
    Completed,
    Failed,
}

impl JobState {
    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::CleaningPrompt => "cleaning_prompt",
            JobState::GeneratingImages => "generating_images",
            JobState::Generating3d => "generating_3d",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Coarse progress indicator tied to the state.
    pub fn progress(self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::CleaningPrompt => 10,
            JobState::GeneratingImages => 30,
            JobState::Generating3d => 60,
            JobState::Completed => 100,
            JobState::Failed => 0,
        }
    }

    /// Message shown to pollers while in this state.
    ///
    /// `Failed` has no default; the failure cause is used instead.
    pub fn default_message(self) -> &'static str {
        match self {
            JobState::Pending => "Starting pipeline...",
            JobState::CleaningPrompt => "Cleaning prompt with AI...",
            JobState::GeneratingImages => "Generating 2D images with DALL-E...",
            JobState::Generating3d => "Generating 3D model with Trellis...",
            JobState::Completed => "3D model ready!",
            JobState::Failed => "Pipeline failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::CleaningPrompt => 1,
            JobState::GeneratingImages => 2,
            JobState::Generating3d => 3,
            JobState::Completed => 4,
            JobState::Failed => 4,
        }
    }

    /// Check whether moving from `self` to `to` is allowed.
    ///
    /// Non-terminal states only move forward along the stage order; `Failed`
    /// is reachable from any non-terminal state; terminal states never move.
    pub fn can_transition(self, to: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            JobState::Failed => true,
            JobState::Completed => self == JobState::Generating3d,
            _ => to.rank() > self.rank(),
        }
    }

    /// Validate a transition, returning a [`CoreError::Validation`] for
    /// invalid ones.
    pub fn validate_transition(self, to: JobState) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid job transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stage wiring helpers
// ---------------------------------------------------------------------------

/// Decide what the model stage receives from the image stage output.
///
/// Multi-image mode is used only when more than one view was requested AND
/// more than one image came back. Otherwise only the first image is passed.
pub fn select_model_input(num_views: u32, images: &[String]) -> Result<ImageInput, CoreError> {
    let first = images.first().ok_or_else(|| {
        CoreError::Upstream("image provider returned no images".to_string())
    })?;

    if num_views > 1 && images.len() > 1 {
        Ok(ImageInput::Multiple(images.to_vec()))
    } else {
        Ok(ImageInput::Single(first.clone()))
    }
}
