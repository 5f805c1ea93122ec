use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use delta_core::pipeline::Stage;
use delta_core::requests::{ImageGenerateParams, ModelGenerateParams, PipelineRequest};
use delta_core::types::{ImageGenerateResult, JobStatus, ModelGenerateResult, PromptCleanResult};
use delta_pipeline::{JobRegistry, Pipeline};
use delta_providers::{ImageGenerator, ModelGenerator, PromptCleaner, ProviderError};

/// One recorded adapter invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Clean {
        prompt: String,
        style: Option<String>,
    },
    Images(ImageGenerateParams),
    Model(ModelGenerateParams),
}

/// In-process stand-in for all three providers that records every call.
pub struct MockProvider {
    pub openai_configured: bool,
    pub fal_configured: bool,
    /// Number of images to return; `None` returns exactly what was asked.
    pub returned_images: Option<usize>,
    pub fail_at: Option<Stage>,
    /// When set, the model stage waits for a notification before returning.
    pub model_gate: Option<Arc<tokio::sync::Notify>>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            openai_configured: true,
            fal_configured: true,
            returned_images: None,
            fail_at: None,
            model_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_fail(&self, stage: Stage) -> Result<(), ProviderError> {
        if self.fail_at == Some(stage) {
            return Err(ProviderError::ApiError {
                provider: "mock",
                status: 500,
                body: format!("{} exploded", stage.timing_key()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PromptCleaner for MockProvider {
    fn is_configured(&self) -> bool {
        self.openai_configured
    }

    async fn clean_prompt(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<PromptCleanResult, ProviderError> {
        self.push(Call::Clean {
            prompt: prompt.to_string(),
            style: style.map(str::to_string),
        });
        self.check_fail(Stage::PromptCleaning)?;
        Ok(PromptCleanResult {
            cleaned_prompt: format!("Cleaned: {prompt}"),
            dalle_prompt: format!("DALL-E: {prompt}"),
        })
    }
}

#[async_trait]
impl ImageGenerator for MockProvider {
    fn is_configured(&self) -> bool {
        self.openai_configured
    }

    async fn generate_images(
        &self,
        params: &ImageGenerateParams,
    ) -> Result<ImageGenerateResult, ProviderError> {
        self.push(Call::Images(params.clone()));
        self.check_fail(Stage::ImageGeneration)?;
        let count = self.returned_images.unwrap_or(params.num_images as usize);
        Ok(ImageGenerateResult {
            images: (1..=count)
                .map(|i| format!("https://img.example/{i}.png"))
                .collect(),
            revised_prompts: Vec::new(),
        })
    }
}

#[async_trait]
impl ModelGenerator for MockProvider {
    fn is_configured(&self) -> bool {
        self.fal_configured
    }

    async fn generate_3d(
        &self,
        params: &ModelGenerateParams,
    ) -> Result<ModelGenerateResult, ProviderError> {
        self.push(Call::Model(params.clone()));
        if let Some(gate) = &self.model_gate {
            gate.notified().await;
        }
        self.check_fail(Stage::ModelGeneration)?;
        Ok(ModelGenerateResult {
            model_url: "https://fal.example/model.glb".into(),
            file_name: "architecture_test.glb".into(),
            file_size_bytes: Some(4),
        })
    }
}

pub fn pipeline_with(mock: Arc<MockProvider>) -> Pipeline {
    Pipeline::new(
        mock.clone(),
        mock.clone(),
        mock,
        Arc::new(JobRegistry::new()),
    )
}

pub fn request(prompt: &str, num_views: u32) -> PipelineRequest {
    PipelineRequest {
        prompt: prompt.to_string(),
        style: None,
        num_views,
        high_quality: false,
        texture_size: 1024,
    }
}

/// Poll the registry until `done` holds for the job, or panic after 5s.
pub async fn wait_for(
    registry: &JobRegistry,
    job_id: &str,
    done: impl Fn(&JobStatus) -> bool,
) -> JobStatus {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let status = registry.get(job_id).await.unwrap();
        if done(&status) {
            return status;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for job {job_id}, last status: {:?}",
            status.status
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
