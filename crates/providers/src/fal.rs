//! fal.ai Trellis client for the 3D stage.
//!
//! Calls the synchronous `fal.run` endpoints, then downloads the produced
//! GLB into the [`ModelStore`] so it can be served from `/download/`.

use async_trait::async_trait;
use delta_core::naming::new_model_file_name;
use delta_core::requests::ModelGenerateParams;
use delta_core::types::{ImageInput, ModelGenerateResult};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::http::{ensure_success, parse_response};
use crate::storage::ModelStore;
use crate::ModelGenerator;

const PROVIDER: &str = "fal.ai";

pub const NOT_CONFIGURED: &str = "fal.ai not configured. Set FAL_KEY.";

/// Endpoint path for single-image generation.
pub const TRELLIS_SINGLE: &str = "fal-ai/trellis";
/// Endpoint path for multi-image generation.
pub const TRELLIS_MULTI: &str = "fal-ai/trellis/multi";

/// HTTP client for fal.ai Trellis.
pub struct FalApi {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    store: ModelStore,
}

#[derive(Debug, Deserialize)]
struct TrellisResponse {
    model_mesh: Option<FalFile>,
}

#[derive(Debug, Deserialize)]
struct FalFile {
    url: String,
}

/// Build the Trellis request payload for the given parameters.
fn trellis_payload(params: &ModelGenerateParams) -> serde_json::Value {
    let options = &params.options;
    let mut payload = serde_json::json!({
        "texture_size": options.texture_size,
        "mesh_simplify": options.mesh_simplify,
        "ss_guidance_strength": options.ss_guidance_strength,
        "slat_guidance_strength": options.slat_guidance_strength,
    });

    match &params.input {
        ImageInput::Multiple(urls) if params.use_multi => {
            payload["image_urls"] = serde_json::json!(urls);
            payload["multiimage_algo"] = serde_json::json!("stochastic");
        }
        input => {
            // Without multi mode only the first image is sent.
            let first = input.urls().first().map(|u| u.to_string()).unwrap_or_default();
            payload["image_url"] = serde_json::json!(first);
        }
    }

    if let Some(seed) = options.seed {
        payload["seed"] = serde_json::json!(seed);
    }
    payload
}

fn endpoint_path(params: &ModelGenerateParams) -> &'static str {
    if params.use_multi && params.input.is_multi() {
        TRELLIS_MULTI
    } else {
        TRELLIS_SINGLE
    }
}

impl FalApi {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_base: config.fal_api_base.clone(),
            api_key: config.fal_key.clone(),
            store: ModelStore::new(config.output_dir.clone()),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(PROVIDER, response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ModelGenerator for FalApi {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_3d(
        &self,
        params: &ModelGenerateParams,
    ) -> Result<ModelGenerateResult, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(NOT_CONFIGURED.to_string()))?;

        if params.input.urls().iter().all(|u| u.trim().is_empty()) {
            return Err(ProviderError::InvalidRequest(
                "Must provide image_url or image_urls".to_string(),
            ));
        }

        let endpoint = format!("{}/{}", self.api_base, endpoint_path(params));
        let payload = trellis_payload(params);
        tracing::info!(
            endpoint = %endpoint,
            images = params.input.urls().len(),
            use_multi = params.use_multi,
            "Submitting Trellis request",
        );

        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Key {api_key}"))
            .json(&payload)
            .send()
            .await?;

        let parsed: TrellisResponse = parse_response(PROVIDER, response).await?;
        let model_url = parsed
            .model_mesh
            .map(|m| m.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                detail: "response contained no model_mesh.url".to_string(),
            })?;

        let bytes = self.download(&model_url).await?;
        let file_name = new_model_file_name();
        let size = self
            .store
            .save(&file_name, &bytes)
            .await
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        tracing::info!(file_name = %file_name, size, "3D model stored");

        Ok(ModelGenerateResult {
            model_url,
            file_name,
            file_size_bytes: Some(size),
        })
    }
}
