//! Provider adapters for the architecture pipeline.
//!
//! Each stage talks to its provider through a trait so the orchestrator and
//! the HTTP handlers can be exercised against in-process fakes:
//!
//! - [`PromptCleaner`] and [`ImageGenerator`]: OpenAI ([`openai::OpenAIApi`])
//! - [`ModelGenerator`]: fal.ai Trellis ([`fal::FalApi`])
//!
//! Every call is a single attempt. A missing credential fails with
//! [`ProviderError::NotConfigured`] before any request is sent.

use async_trait::async_trait;
use delta_core::requests::{ImageGenerateParams, ModelGenerateParams};
use delta_core::types::{ImageGenerateResult, ModelGenerateResult, PromptCleanResult};

pub mod config;
pub mod error;
pub mod fal;
mod http;
pub mod openai;
pub mod storage;

pub use error::ProviderError;

/// Rewrites a raw user prompt for architectural 3D generation.
#[async_trait]
pub trait PromptCleaner: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn clean_prompt(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<PromptCleanResult, ProviderError>;
}

/// Produces 2D images from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn generate_images(
        &self,
        params: &ImageGenerateParams,
    ) -> Result<ImageGenerateResult, ProviderError>;
}

/// Converts one or more images into a stored 3D model.
#[async_trait]
pub trait ModelGenerator: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn generate_3d(
        &self,
        params: &ModelGenerateParams,
    ) -> Result<ModelGenerateResult, ProviderError>;
}
