//! Text -> cleaned prompt -> 2D images -> 3D model.
//!
//! The three stages always run in order, each awaiting the previous one.
//! The first failure aborts the run; nothing is retried or rolled back.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use delta_core::error::CoreError;
use delta_core::naming::{download_url, poll_url};
use delta_core::pipeline::{select_model_input, JobState, Stage};
use delta_core::requests::{ImageGenerateParams, ModelGenerateParams, ModelOptions, PipelineRequest};
use delta_core::types::{
    new_job_id, ImageGenerateResult, JobId, JobStatus, ModelGenerateResult, PipelineResult,
    PromptCleanResult,
};
use delta_providers::{fal, openai, ImageGenerator, ModelGenerator, PromptCleaner};

use crate::jobs::JobRegistry;

/// Handle returned when an async run has been scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedJob {
    pub job_id: JobId,
    pub poll_url: String,
}

/// Outputs of a completed run, before they are shaped into a result.
struct StageOutputs {
    clean: PromptCleanResult,
    images: ImageGenerateResult,
    model: ModelGenerateResult,
    timings: BTreeMap<String, f64>,
}

/// Composes the three provider adapters and the job registry.
///
/// Cheap to clone; every field is behind an `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    cleaner: Arc<dyn PromptCleaner>,
    images: Arc<dyn ImageGenerator>,
    models: Arc<dyn ModelGenerator>,
    jobs: Arc<JobRegistry>,
}

impl Pipeline {
    pub fn new(
        cleaner: Arc<dyn PromptCleaner>,
        images: Arc<dyn ImageGenerator>,
        models: Arc<dyn ModelGenerator>,
        jobs: Arc<JobRegistry>,
    ) -> Self {
        Self {
            cleaner,
            images,
            models,
            jobs,
        }
    }

    pub fn cleaner(&self) -> &dyn PromptCleaner {
        self.cleaner.as_ref()
    }

    pub fn image_generator(&self) -> &dyn ImageGenerator {
        self.images.as_ref()
    }

    pub fn model_generator(&self) -> &dyn ModelGenerator {
        self.models.as_ref()
    }

    pub fn jobs(&self) -> &Arc<JobRegistry> {
        &self.jobs
    }

    /// Whether the text/image provider credential is present.
    pub fn openai_configured(&self) -> bool {
        self.cleaner.is_configured() && self.images.is_configured()
    }

    /// Whether the 3D provider credential is present.
    pub fn fal_configured(&self) -> bool {
        self.models.is_configured()
    }

    /// Fail with `ServiceUnavailable` unless every provider is configured.
    pub fn ensure_configured(&self) -> Result<(), CoreError> {
        if !self.openai_configured() {
            return Err(CoreError::ServiceUnavailable(openai::NOT_CONFIGURED.to_string()));
        }
        if !self.fal_configured() {
            return Err(CoreError::ServiceUnavailable(fal::NOT_CONFIGURED.to_string()));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Synchronous mode
    // -----------------------------------------------------------------------

    /// Run all stages and return the full result with timings.
    pub async fn run_sync(&self, request: &PipelineRequest) -> Result<PipelineResult, CoreError> {
        self.ensure_configured()?;

        let job_id = new_job_id();
        let started = Instant::now();
        tracing::info!(job_id = %job_id, num_views = request.num_views, "Pipeline started");

        let outputs = match self.execute(&job_id, request, false).await {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Pipeline failed");
                return Err(e);
            }
        };

        let total_time = started.elapsed().as_secs_f64();
        tracing::info!(job_id = %job_id, total_time, "Pipeline completed");

        Ok(build_result(job_id, request, outputs, total_time, true))
    }

    // -----------------------------------------------------------------------
    // Asynchronous mode
    // -----------------------------------------------------------------------

    /// Register a pending job and run the pipeline for it in the background.
    ///
    /// Returns as soon as the task is spawned. There is no way to cancel it.
    pub async fn start_async(&self, request: PipelineRequest) -> Result<StartedJob, CoreError> {
        self.ensure_configured()?;

        let job_id = new_job_id();
        self.jobs
            .put(job_id.clone(), JobStatus::pending(job_id.clone()))
            .await;

        let pipeline = self.clone();
        let task_job_id = job_id.clone();
        tokio::spawn(async move {
            pipeline.run_async(task_job_id, request).await;
        });

        tracing::info!(job_id = %job_id, "Async pipeline scheduled");
        Ok(StartedJob {
            poll_url: poll_url(&job_id),
            job_id,
        })
    }

    /// Background body of an async run. Records progress and the outcome in
    /// the job registry instead of returning it.
    pub async fn run_async(&self, job_id: JobId, request: PipelineRequest) {
        if self.jobs.get(&job_id).await.is_err() {
            self.jobs
                .put(job_id.clone(), JobStatus::pending(job_id.clone()))
                .await;
        }

        let recorded = match self.execute(&job_id, &request, true).await {
            Ok(outputs) => {
                // Async runs do not report timings.
                let result = build_result(job_id.clone(), &request, outputs, 0.0, false);
                tracing::info!(job_id = %job_id, "Async pipeline completed");
                self.jobs.complete(&job_id, result).await
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Async pipeline failed");
                self.jobs.fail(&job_id, format!("Error: {e}")).await
            }
        };

        if let Err(e) = recorded {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to record job outcome");
        }
    }

    // -----------------------------------------------------------------------
    // Stage execution
    // -----------------------------------------------------------------------

    async fn execute(
        &self,
        job_id: &str,
        request: &PipelineRequest,
        track: bool,
    ) -> Result<StageOutputs, CoreError> {
        let mut timings = BTreeMap::new();

        // Stage 1: clean the prompt.
        self.enter(job_id, Stage::PromptCleaning, track).await;
        let stage_start = Instant::now();
        let clean = self
            .cleaner
            .clean_prompt(&request.prompt, request.style.as_deref())
            .await
            .map_err(|e| CoreError::from(e).in_stage(Stage::PromptCleaning.label()))?;
        record(&mut timings, Stage::PromptCleaning, stage_start);

        // Stage 2: generate the 2D views from the optimized prompt.
        self.enter(job_id, Stage::ImageGeneration, track).await;
        let stage_start = Instant::now();
        let image_params = ImageGenerateParams::for_pipeline(
            &clean.dalle_prompt,
            request.num_views,
            request.high_quality,
        );
        let images = self
            .images
            .generate_images(&image_params)
            .await
            .map_err(|e| CoreError::from(e).in_stage(Stage::ImageGeneration.label()))?;
        record(&mut timings, Stage::ImageGeneration, stage_start);

        // Stage 3: convert the selected image(s) into a model.
        self.enter(job_id, Stage::ModelGeneration, track).await;
        let stage_start = Instant::now();
        let input = select_model_input(request.num_views, &images.images)
            .map_err(|e| e.in_stage(Stage::ImageGeneration.label()))?;
        let model_params = ModelGenerateParams {
            use_multi: input.is_multi(),
            input,
            options: ModelOptions {
                texture_size: request.texture_size,
                ..ModelOptions::default()
            },
        };
        let model = self
            .models
            .generate_3d(&model_params)
            .await
            .map_err(|e| CoreError::from(e).in_stage(Stage::ModelGeneration.label()))?;
        record(&mut timings, Stage::ModelGeneration, stage_start);

        Ok(StageOutputs {
            clean,
            images,
            model,
            timings,
        })
    }

    /// Log the stage and, for tracked runs, advance the job record.
    async fn enter(&self, job_id: &str, stage: Stage, track: bool) {
        tracing::debug!(job_id = %job_id, stage = stage.timing_key(), "Entering stage");
        if !track {
            return;
        }
        if let Err(e) = self.jobs.advance(job_id, stage.job_state()).await {
            tracing::warn!(job_id = %job_id, error = %e, "Job state not advanced");
        }
    }
}

fn record(timings: &mut BTreeMap<String, f64>, stage: Stage, started: Instant) {
    timings.insert(
        stage.timing_key().to_string(),
        started.elapsed().as_secs_f64(),
    );
}

fn build_result(
    job_id: JobId,
    request: &PipelineRequest,
    outputs: StageOutputs,
    total_time: f64,
    with_timings: bool,
) -> PipelineResult {
    let StageOutputs {
        clean,
        images,
        model,
        timings,
    } = outputs;

    PipelineResult {
        job_id,
        status: JobState::Completed.as_str().to_string(),
        original_prompt: request.prompt.clone(),
        cleaned_prompt: clean.cleaned_prompt,
        dalle_prompt: clean.dalle_prompt,
        image_urls: images.images,
        download_url: download_url(&model.file_name),
        model_url: model.model_url,
        model_file: model.file_name,
        total_time,
        stages: if with_timings { timings } else { BTreeMap::new() },
    }
}
