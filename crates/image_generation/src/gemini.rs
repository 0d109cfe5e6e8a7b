//! Gemini `generateContent` backend.
//!
//! One request per banner: every source photo goes up as an inline image part
//! followed by the text prompt, and the first inline image in the reply is the
//! banner. No retries; a failed call is reported to the caller as-is.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

use crate::{to_data_url, BannerImageGenerator, GenerationError, GenerationRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Prepended to the price in the prompt, e.g. `S/`.
    pub currency_prefix: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            currency_prefix: "S/".into(),
        }
    }
}

pub struct GeminiImageGenerator {
    http: Client,
    endpoint: Url,
    config: GeminiConfig,
}

impl GeminiImageGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::InvalidConfig("api key is empty".into()));
        }
        let endpoint = generate_content_url(&config.base_url, &config.model)?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_body(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts: Vec<Part> = request
            .images
            .iter()
            .map(|image| Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.bytes),
                }),
            })
            .collect();
        parts.push(Part {
            text: Some(banner_prompt(
                &request.title,
                request.price,
                &self.config.currency_prefix,
            )),
            inline_data: None,
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            },
        }
    }
}

#[async_trait]
impl BannerImageGenerator for GeminiImageGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        request.validate()?;
        let body = self.request_body(&request);
        info!(
            model = %self.config.model,
            images = request.images.len(),
            "requesting banner image"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = remote_error_message(&raw)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            error!(status = status.as_u16(), %message, "banner image generation rejected");
            return Err(GenerationError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        extract_image(reply)
    }
}

pub fn banner_prompt(title: &str, price: f64, currency_prefix: &str) -> String {
    format!(
        "Create an eye-catching promotional food banner in a square format. \
         Combine the food shown in the provided photos into one appetizing composition. \
         Display the title \"{title}\" prominently and the price \"{currency_prefix}{price:.2}\" clearly. \
         Use bold, legible typography and vibrant colors. Do not add any other text."
    )
}

fn generate_content_url(base_url: &str, model: &str) -> Result<Url, GenerationError> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| GenerationError::InvalidConfig(format!("base url '{base_url}': {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("v1beta/models/{model}:generateContent"))
        .map_err(|e| GenerationError::InvalidConfig(format!("model '{model}': {e}")))
}

fn remote_error_message(raw: &str) -> Option<String> {
    let body: RemoteErrorBody = serde_json::from_str(raw).ok()?;
    let message = body.error.message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn extract_image(reply: GenerateContentResponse) -> Result<String, GenerationError> {
    let parts = reply
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts);

    let mut text = Vec::new();
    for part in parts {
        if let Some(inline) = part.inline_data {
            let bytes = STANDARD.decode(inline.data.as_bytes()).map_err(|e| {
                GenerationError::MalformedResponse(format!("invalid image data: {e}"))
            })?;
            return Ok(to_data_url(&inline.mime_type, &bytes));
        }
        if let Some(t) = part.text {
            text.push(t);
        }
    }

    let text = text.join(" ");
    Err(GenerationError::NoImage {
        text: (!text.trim().is_empty()).then_some(text),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: RemoteErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
#[path = "tests/gemini_tests.rs"]
mod tests;
