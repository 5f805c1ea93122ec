//! Handlers for the single-stage and full-pipeline generation endpoints.
//!
//! Every handler checks provider configuration first (503), then validates
//! the body (400), and only then calls a provider.

use axum::extract::State;
use axum::Json;
use delta_core::error::CoreError;
use delta_core::pipeline::Stage;
use delta_core::requests::{
    ImageGenerateRequest, ModelGenerateRequest, PipelineRequest, PromptCleanRequest,
};
use delta_core::types::{ImageGenerateResult, ModelGenerateResult, PipelineResult, PromptCleanResult};
use delta_providers::{fal, openai};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Response of `POST /generate-architecture-async`.
#[derive(Debug, Serialize)]
pub struct AsyncStartResponse {
    pub job_id: String,
    pub status: &'static str,
    pub poll_url: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fail with 503 and `message` unless `configured`.
fn require_configured(configured: bool, message: &str) -> Result<(), CoreError> {
    if configured {
        Ok(())
    } else {
        Err(CoreError::ServiceUnavailable(message.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Single stages
// ---------------------------------------------------------------------------

/// POST /clean-prompt
///
/// Clean and enhance a user prompt for architectural 3D generation.
pub async fn clean_prompt(
    State(state): State<AppState>,
    Json(input): Json<PromptCleanRequest>,
) -> AppResult<Json<PromptCleanResult>> {
    let cleaner = state.pipeline.cleaner();
    require_configured(cleaner.is_configured(), openai::NOT_CONFIGURED)?;
    input.validate_request()?;

    let result = cleaner
        .clean_prompt(&input.prompt, input.style.as_deref())
        .await
        .map_err(|e| CoreError::from(e).in_stage(Stage::PromptCleaning.label()))?;

    Ok(Json(result))
}

/// POST /generate-image
///
/// Generate one or more 2D views of a building.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(input): Json<ImageGenerateRequest>,
) -> AppResult<Json<ImageGenerateResult>> {
    let generator = state.pipeline.image_generator();
    require_configured(generator.is_configured(), openai::NOT_CONFIGURED)?;
    input.validate_request()?;

    let result = generator
        .generate_images(&input.to_params())
        .await
        .map_err(|e| CoreError::from(e).in_stage(Stage::ImageGeneration.label()))?;

    tracing::info!(count = result.images.len(), "Images generated");
    Ok(Json(result))
}

/// POST /generate-3d
///
/// Generate a GLB model from one image or an ordered set of views.
/// Returns 400 when neither `image_url` nor `image_urls` is given.
pub async fn generate_3d(
    State(state): State<AppState>,
    Json(input): Json<ModelGenerateRequest>,
) -> AppResult<Json<ModelGenerateResult>> {
    let generator = state.pipeline.model_generator();
    require_configured(generator.is_configured(), fal::NOT_CONFIGURED)?;
    let params = input.to_params()?;

    let result = generator
        .generate_3d(&params)
        .await
        .map_err(|e| CoreError::from(e).in_stage(Stage::ModelGeneration.label()))?;

    tracing::info!(file_name = %result.file_name, "3D model generated");
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

/// POST /generate-architecture
///
/// Run the full pipeline and hold the connection until it finishes.
pub async fn generate_architecture(
    State(state): State<AppState>,
    Json(input): Json<PipelineRequest>,
) -> AppResult<Json<PipelineResult>> {
    state.pipeline.ensure_configured()?;
    input.validate_request()?;

    let result = state
        .pipeline
        .run_sync(&input)
        .await
        .map_err(|e| e.in_stage("Pipeline"))?;

    Ok(Json(result))
}

/// POST /generate-architecture-async
///
/// Schedule the full pipeline in the background and return a job id to poll.
pub async fn generate_architecture_async(
    State(state): State<AppState>,
    Json(input): Json<PipelineRequest>,
) -> AppResult<Json<AsyncStartResponse>> {
    state.pipeline.ensure_configured()?;
    input.validate_request()?;

    let started = state.pipeline.start_async(input).await?;

    Ok(Json(AsyncStartResponse {
        job_id: started.job_id,
        status: "started",
        poll_url: started.poll_url,
    }))
}
