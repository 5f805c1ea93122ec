#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use delta_core::pipeline::Stage;
use delta_core::requests::{ImageGenerateParams, ModelGenerateParams};
use delta_core::types::{ImageGenerateResult, ModelGenerateResult, PromptCleanResult};
use delta_pipeline::{JobRegistry, Pipeline};
use delta_providers::storage::ModelStore;
use delta_providers::{ImageGenerator, ModelGenerator, PromptCleaner, ProviderError};
use http_body_util::BodyExt;
use tower::ServiceExt;

use delta_api::config::ServerConfig;
use delta_api::router::build_app_router;
use delta_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Provider stand-in recording how many times each stage was called.
pub struct MockProvider {
    pub openai_configured: bool,
    pub fal_configured: bool,
    pub fail_at: Option<Stage>,
    /// When set, the model stage waits for a notification before returning.
    pub model_gate: Option<Arc<tokio::sync::Notify>>,
    pub calls: Mutex<Vec<Stage>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            openai_configured: true,
            fal_configured: true,
            fail_at: None,
            model_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            openai_configured: false,
            fal_configured: false,
            ..Self::new()
        }
    }

    pub fn failing_at(stage: Stage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn stages_called(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, stage: Stage) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(stage);
        if self.fail_at == Some(stage) {
            return Err(ProviderError::ApiError {
                provider: "mock",
                status: 502,
                body: "upstream exploded".into(),
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
        _style: Option<&str>,
    ) -> Result<PromptCleanResult, ProviderError> {
        self.record(Stage::PromptCleaning)?;
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
        self.record(Stage::ImageGeneration)?;
        Ok(ImageGenerateResult {
            images: (1..=params.num_images)
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
        _params: &ModelGenerateParams,
    ) -> Result<ModelGenerateResult, ProviderError> {
        if let Some(gate) = &self.model_gate {
            gate.notified().await;
        }
        self.record(Stage::ModelGeneration)?;
        Ok(ModelGenerateResult {
            model_url: "https://fal.example/model.glb".into(),
            file_name: "architecture_20240101_000000_abcd1234.glb".into(),
            file_size_bytes: Some(4),
        })
    }
}

/// Build the full application router around `mock`, serving model files
/// from `output_dir`.
pub fn build_test_app(mock: Arc<MockProvider>, output_dir: &Path) -> Router {
    let config = test_config();
    let pipeline = Pipeline::new(
        mock.clone(),
        mock.clone(),
        mock,
        Arc::new(JobRegistry::new()),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline,
        store: ModelStore::new(output_dir),
    };

    build_app_router(state, &config)
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body against the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Poll `/job/{job_id}` until its status is terminal, or panic after 5s.
pub async fn poll_until_done(app: &Router, job_id: &str) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let response = get(app.clone(), &format!("/job/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] == "completed" || json["status"] == "failed" {
            return json;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for job {job_id}: {json}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Poll `/job/{job_id}` until its status equals `status`, or panic after 5s.
pub async fn poll_until_status(app: &Router, job_id: &str, status: &str) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let json = body_json(get(app.clone(), &format!("/job/{job_id}")).await).await;
        if json["status"] == status {
            return json;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {status} on job {job_id}: {json}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
