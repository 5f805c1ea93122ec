//! Request bodies accepted by the HTTP surface, their defaults, and the
//! parameter structs handed to provider adapters.
//!
//! Bodies derive [`validator::Validate`] for numeric ranges and lengths;
//! enumerated string values are checked against the constant lists below.

use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;
use crate::types::ImageInput;

// ---------------------------------------------------------------------------
// Enumerated values
// ---------------------------------------------------------------------------

pub const QUALITY_STANDARD: &str = "standard";
pub const QUALITY_HD: &str = "hd";
pub const VALID_QUALITIES: &[&str] = &[QUALITY_STANDARD, QUALITY_HD];

pub const VALID_IMAGE_SIZES: &[&str] = &["1024x1024", "1792x1024", "1024x1792"];
pub const VALID_IMAGE_STYLES: &[&str] = &["natural", "vivid"];
pub const VALID_TEXTURE_SIZES: &[u32] = &[512, 1024, 1536, 2048];

pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_IMAGE_STYLE: &str = "natural";
pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;
pub const DEFAULT_MESH_SIMPLIFY: f64 = 0.95;
pub const DEFAULT_SS_GUIDANCE_STRENGTH: f64 = 7.5;
pub const DEFAULT_SLAT_GUIDANCE_STRENGTH: f64 = 3.0;

/// Upper bound on images or views per request.
pub const MAX_VIEWS: u32 = 4;

/// Image quality tier used by the pipeline for the given flag.
pub fn quality_for(high_quality: bool) -> &'static str {
    if high_quality {
        QUALITY_HD
    } else {
        QUALITY_STANDARD
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

/// Validate a texture size against the sizes the 3D provider accepts.
pub fn validate_texture_size(size: u32) -> Result<(), CoreError> {
    if VALID_TEXTURE_SIZES.contains(&size) {
        Ok(())
    } else {
        let allowed: Vec<String> = VALID_TEXTURE_SIZES.iter().map(u32::to_string).collect();
        Err(CoreError::Validation(format!(
            "Invalid texture_size {size}. Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

fn run_validator<T: Validate>(body: &T) -> Result<(), CoreError> {
    body.validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

fn default_count() -> u32 {
    1
}

fn default_image_size() -> String {
    DEFAULT_IMAGE_SIZE.to_string()
}

fn default_quality() -> String {
    QUALITY_STANDARD.to_string()
}

fn default_image_style() -> String {
    DEFAULT_IMAGE_STYLE.to_string()
}

fn default_texture_size() -> u32 {
    DEFAULT_TEXTURE_SIZE
}

// ---------------------------------------------------------------------------
// HTTP bodies
// ---------------------------------------------------------------------------

/// Body of `POST /clean-prompt`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PromptCleanRequest {
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
}

impl PromptCleanRequest {
    pub fn validate_request(&self) -> Result<(), CoreError> {
        run_validator(self)
    }
}

/// Body of `POST /generate-image`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImageGenerateRequest {
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = MAX_VIEWS))]
    pub num_images: u32,
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_image_style")]
    pub style: String,
}

impl ImageGenerateRequest {
    pub fn validate_request(&self) -> Result<(), CoreError> {
        run_validator(self)?;
        check_one_of("size", &self.size, VALID_IMAGE_SIZES)?;
        check_one_of("quality", &self.quality, VALID_QUALITIES)?;
        check_one_of("style", &self.style, VALID_IMAGE_STYLES)
    }

    pub fn to_params(&self) -> ImageGenerateParams {
        ImageGenerateParams {
            prompt: self.prompt.clone(),
            num_images: self.num_images,
            size: self.size.clone(),
            quality: self.quality.clone(),
            style: self.style.clone(),
        }
    }
}

/// Body of `POST /generate-3d`.
///
/// `image_url` and `image_urls` are resolved into an [`ImageInput`] by
/// [`ModelGenerateRequest::image_input`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModelGenerateRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub use_multi: bool,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub texture_size: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 0.9, max = 0.98))]
    pub mesh_simplify: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub ss_guidance_strength: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub slat_guidance_strength: Option<f64>,
}

impl ModelGenerateRequest {
    /// Resolve the two optional image fields into a tagged input.
    ///
    /// With `use_multi` and a non-empty `image_urls`, all URLs are used.
    /// Otherwise `image_url` wins, then the first entry of `image_urls`.
    pub fn image_input(&self) -> Result<ImageInput, CoreError> {
        let urls: Vec<String> = self
            .image_urls
            .iter()
            .flatten()
            .filter(|u| !u.trim().is_empty())
            .cloned()
            .collect();
        let single = self
            .image_url
            .as_deref()
            .filter(|u| !u.trim().is_empty());

        if self.use_multi && !urls.is_empty() {
            return Ok(ImageInput::Multiple(urls));
        }
        if let Some(url) = single {
            return Ok(ImageInput::Single(url.to_string()));
        }
        match urls.into_iter().next() {
            Some(first) => Ok(ImageInput::Single(first)),
            None => Err(CoreError::Validation(
                "Must provide image_url or image_urls".to_string(),
            )),
        }
    }

    /// Validate and convert into adapter parameters.
    pub fn to_params(&self) -> Result<ModelGenerateParams, CoreError> {
        let input = self.image_input()?;
        run_validator(self)?;
        if let Some(size) = self.texture_size {
            validate_texture_size(size)?;
        }

        let defaults = ModelOptions::default();
        Ok(ModelGenerateParams {
            use_multi: input.is_multi(),
            input,
            options: ModelOptions {
                seed: self.seed,
                texture_size: self.texture_size.unwrap_or(defaults.texture_size),
                mesh_simplify: self.mesh_simplify.unwrap_or(defaults.mesh_simplify),
                ss_guidance_strength: self
                    .ss_guidance_strength
                    .unwrap_or(defaults.ss_guidance_strength),
                slat_guidance_strength: self
                    .slat_guidance_strength
                    .unwrap_or(defaults.slat_guidance_strength),
            },
        })
    }
}

/// Body of `POST /generate-architecture` and its async variant.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PipelineRequest {
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = MAX_VIEWS))]
    pub num_views: u32,
    #[serde(default)]
    pub high_quality: bool,
    #[serde(default = "default_texture_size")]
    pub texture_size: u32,
}

impl PipelineRequest {
    pub fn validate_request(&self) -> Result<(), CoreError> {
        run_validator(self)?;
        validate_texture_size(self.texture_size)
    }
}

// ---------------------------------------------------------------------------
// Adapter parameters
// ---------------------------------------------------------------------------

/// Input to the image generation adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerateParams {
    pub prompt: String,
    pub num_images: u32,
    pub size: String,
    pub quality: String,
    pub style: String,
}

impl ImageGenerateParams {
    /// Parameters the pipeline uses for its image stage.
    pub fn for_pipeline(prompt: &str, num_views: u32, high_quality: bool) -> Self {
        Self {
            prompt: prompt.to_string(),
            num_images: num_views,
            size: DEFAULT_IMAGE_SIZE.to_string(),
            quality: quality_for(high_quality).to_string(),
            style: DEFAULT_IMAGE_STYLE.to_string(),
        }
    }
}

/// Tuning knobs of the 3D provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    pub seed: Option<i64>,
    pub texture_size: u32,
    pub mesh_simplify: f64,
    pub ss_guidance_strength: f64,
    pub slat_guidance_strength: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            seed: None,
            texture_size: DEFAULT_TEXTURE_SIZE,
            mesh_simplify: DEFAULT_MESH_SIMPLIFY,
            ss_guidance_strength: DEFAULT_SS_GUIDANCE_STRENGTH,
            slat_guidance_strength: DEFAULT_SLAT_GUIDANCE_STRENGTH,
        }
    }
}

/// Input to the model generation adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGenerateParams {
    pub input: ImageInput,
    pub use_multi: bool,
    pub options: ModelOptions,
}
