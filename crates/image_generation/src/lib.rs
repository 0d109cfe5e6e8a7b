use async_trait::async_trait;
use thiserror::Error;

mod data_url;
mod gemini;

pub use data_url::{decode_data_url, to_data_url};
pub use gemini::{
    banner_prompt, GeminiConfig, GeminiImageGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL,
};

/// Shown when a failure carries no usable message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub title: String,
    pub price: f64,
    pub images: Vec<SourceImage>,
}

impl GenerationRequest {
    /// Rejects requests that must never reach the remote service.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.title.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("title is required".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(GenerationError::InvalidRequest(
                "price must be a non-negative number".into(),
            ));
        }
        if self.images.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "at least one source image is required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("invalid image generation configuration: {0}")]
    InvalidConfig(String),
    #[error("image generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("image generation service returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("malformed response from image generation service: {0}")]
    MalformedResponse(String),
    #[error("the model did not return an image")]
    NoImage { text: Option<String> },
    #[error("image generation is not configured")]
    Unavailable,
}

impl GenerationError {
    /// Message suitable for showing inline next to the banner form.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest(message) => message.clone(),
            Self::Remote { message, .. } if message.trim().is_empty() => {
                FALLBACK_ERROR_MESSAGE.to_string()
            }
            Self::Remote { message, .. } => message.clone(),
            Self::NoImage { text: Some(text) } => {
                format!("The model did not return an image: {text}")
            }
            other => {
                let message = other.to_string();
                if message.is_empty() {
                    FALLBACK_ERROR_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }
}

/// Turns a title, a price and a set of food photos into one composed banner
/// image, returned as a data URL.
#[async_trait]
pub trait BannerImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Stand-in used when no generation backend is configured.
pub struct MissingImageGenerator;

#[async_trait]
impl BannerImageGenerator for MissingImageGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        request.validate()?;
        Err(GenerationError::Unavailable)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
