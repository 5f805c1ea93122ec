//! OpenAI client: chat completions for prompt cleaning, image generations
//! for the 2D stage.

use async_trait::async_trait;
use delta_core::requests::ImageGenerateParams;
use delta_core::types::{ImageGenerateResult, PromptCleanResult};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::http::parse_response;
use crate::{ImageGenerator, PromptCleaner};

const PROVIDER: &str = "OpenAI";

pub const NOT_CONFIGURED: &str = "OpenAI not configured. Set OPENAI_API_KEY.";

const CLEAN_PROMPT_SYSTEM: &str = "You turn rough user descriptions into prompts for \
generating a single architectural building that will be converted into a 3D model. \
Fix spelling, remove anything unrelated to the building, and keep the user's intent. \
The image prompt must describe one isolated building, fully visible, centered, \
three-quarter view, plain neutral background, soft even lighting, no people, no text, \
no surrounding scenery. Reply with a JSON object with exactly two string keys: \
\"cleaned_prompt\" (short human-readable description) and \"dalle_prompt\" \
(detailed prompt for the image model).";

/// HTTP client for the OpenAI REST API.
pub struct OpenAIApi {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    chat_model: String,
    image_model: String,
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

impl OpenAIApi {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_base: config.openai_api_base.clone(),
            api_key: config.openai_api_key.clone(),
            chat_model: config.openai_chat_model.clone(),
            image_model: config.openai_image_model.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(NOT_CONFIGURED.to_string()))
    }

    /// Request a single image. DALL-E 3 only accepts `n = 1`.
    async fn generate_one(
        &self,
        api_key: &str,
        params: &ImageGenerateParams,
    ) -> Result<ImageData, ProviderError> {
        let body = serde_json::json!({
            "model": self.image_model,
            "prompt": params.prompt,
            "n": 1,
            "size": params.size,
            "quality": params.quality,
            "style": params.style,
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ImagesResponse = parse_response(PROVIDER, response).await?;
        parsed
            .data
            .into_iter()
            .next()
            .filter(|d| d.url.is_some())
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                detail: "image response contained no URL".to_string(),
            })
    }
}

/// Build the user message for prompt cleaning.
fn clean_prompt_message(prompt: &str, style: Option<&str>) -> String {
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => format!("Architectural style: {style}\nDescription: {prompt}"),
        None => format!("Description: {prompt}"),
    }
}

/// Extract the cleaned prompt pair from the model's JSON reply.
fn parse_clean_reply(content: &str) -> Result<PromptCleanResult, ProviderError> {
    let parsed: PromptCleanResult =
        serde_json::from_str(content.trim()).map_err(|e| ProviderError::InvalidResponse {
            provider: PROVIDER,
            detail: format!("prompt reply is not the expected JSON: {e}"),
        })?;

    if parsed.cleaned_prompt.trim().is_empty() || parsed.dalle_prompt.trim().is_empty() {
        return Err(ProviderError::InvalidResponse {
            provider: PROVIDER,
            detail: "prompt reply contained an empty prompt".to_string(),
        });
    }
    Ok(parsed)
}

#[async_trait]
impl PromptCleaner for OpenAIApi {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn clean_prompt(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<PromptCleanResult, ProviderError> {
        let api_key = self.api_key()?;

        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": CLEAN_PROMPT_SYSTEM },
                { "role": "user", "content": clean_prompt_message(prompt, style) },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatCompletionResponse = parse_response(PROVIDER, response).await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                detail: "chat completion contained no message".to_string(),
            })?;

        let result = parse_clean_reply(&content)?;
        tracing::debug!(cleaned = %result.cleaned_prompt, "Prompt cleaned");
        Ok(result)
    }
}

#[async_trait]
impl ImageGenerator for OpenAIApi {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate `params.num_images` images with one request each, keeping
    /// the URLs in request order.
    async fn generate_images(
        &self,
        params: &ImageGenerateParams,
    ) -> Result<ImageGenerateResult, ProviderError> {
        let api_key = self.api_key()?;
        if params.num_images == 0 {
            return Err(ProviderError::InvalidRequest(
                "num_images must be at least 1".to_string(),
            ));
        }

        let mut images = Vec::with_capacity(params.num_images as usize);
        let mut revised_prompts = Vec::new();
        for index in 0..params.num_images {
            let data = self.generate_one(api_key, params).await?;
            tracing::debug!(index, total = params.num_images, "Image generated");
            if let Some(revised) = data.revised_prompt {
                revised_prompts.push(revised);
            }
            if let Some(url) = data.url {
                images.push(url);
            }
        }

        Ok(ImageGenerateResult {
            images,
            revised_prompts,
        })
    }
}
