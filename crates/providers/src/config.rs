use std::path::PathBuf;

use crate::http::{non_empty_env, trim_base};

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_FAL_API_BASE: &str = "https://fal.run";
pub const DEFAULT_OUTPUT_DIR: &str = "./outputs";

/// Provider credentials and endpoints loaded from environment variables.
///
/// A missing or blank credential leaves the matching provider unconfigured;
/// the server still starts and reports it via the health endpoints.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_chat_model: String,
    pub openai_image_model: String,
    pub fal_key: Option<String>,
    pub fal_api_base: String,
    /// Directory where downloaded model files are stored and served from.
    pub output_dir: PathBuf,
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                       |
    /// |----------------------|-------------------------------|
    /// | `OPENAI_API_KEY`     | unset                         |
    /// | `OPENAI_API_BASE`    | `https://api.openai.com/v1`   |
    /// | `OPENAI_CHAT_MODEL`  | `gpt-4o`                      |
    /// | `OPENAI_IMAGE_MODEL` | `dall-e-3`                    |
    /// | `FAL_KEY`            | unset (`FAL_API_KEY` fallback)|
    /// | `FAL_API_BASE`       | `https://fal.run`             |
    /// | `OUTPUT_DIR`         | `./outputs`                   |
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_api_base: non_empty_env("OPENAI_API_BASE")
                .map(|v| trim_base(&v))
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            openai_chat_model: non_empty_env("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_CHAT_MODEL.to_string()),
            openai_image_model: non_empty_env("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_IMAGE_MODEL.to_string()),
            fal_key: non_empty_env("FAL_KEY").or_else(|| non_empty_env("FAL_API_KEY")),
            fal_api_base: non_empty_env("FAL_API_BASE")
                .map(|v| trim_base(&v))
                .unwrap_or_else(|| DEFAULT_FAL_API_BASE.to_string()),
            output_dir: non_empty_env("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

impl Default for ProviderConfig {
    /// Defaults with no credentials.
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            openai_chat_model: DEFAULT_OPENAI_CHAT_MODEL.to_string(),
            openai_image_model: DEFAULT_OPENAI_IMAGE_MODEL.to_string(),
            fal_key: None,
            fal_api_base: DEFAULT_FAL_API_BASE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}
