use async_trait::async_trait;
use bon::Builder;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use crate::models::types::{Credential, PendingImage};
use crate::services::settings::GeminiConfig;
use crate::traits::vision_api::{VisionApi, VisionApiError};

/// Finish reasons Gemini uses when it withholds output on policy grounds
const POLICY_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "IMAGE_SAFETY"];

/// `VisionApi` backed by the Gemini `generateContent` REST endpoint.
#[derive(Builder)]
pub struct GeminiVisionApi {
    client: Client,
    endpoint: String,
    api_key: Credential,
    model: String,
    temperature: f32,
}

impl GeminiVisionApi {
    /// Builds the client from settings.
    ///
    /// # Errors
    ///
    /// `VisionApiError::Construction` when the base URL does not parse or the
    /// HTTP client cannot be created.
    pub fn new(api_key: &Credential, cfg: &GeminiConfig) -> Result<Self, VisionApiError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| VisionApiError::Construction(format!("invalid base url {:?}: {}", cfg.base_url, e)))?;
        if cfg.model.trim().is_empty() {
            return Err(VisionApiError::Construction("model name cannot be empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| VisionApiError::Construction(e.to_string()))?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base.as_str().trim_end_matches('/'),
            cfg.model
        );

        Ok(Self::builder()
            .client(client)
            .endpoint(endpoint)
            .api_key(api_key.clone())
            .model(cfg.model.clone())
            .temperature(cfg.temperature)
            .build())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VisionApi for GeminiVisionApi {
    async fn describe_image(&self, prompt: &str, image: &PendingImage) -> Result<String, VisionApiError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        info!(
            model = %self.model,
            mime_type = %image.mime_type,
            image_len = image.data.len(),
            prompt_len = prompt.len(),
            "gemini: generateContent request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "gemini: HTTP error");
                VisionApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VisionApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = parse_error_body(status.as_u16(), &text);
            error!(status = status.as_u16(), error = %err, "gemini: request failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| VisionApiError::Malformed(e.to_string()))?;
        let output = extract_text(parsed)?;
        info!(model = %self.model, response_len = output.len(), "gemini: generateContent response");
        Ok(output)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

pub(crate) fn parse_error_body(status: u16, body: &str) -> VisionApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => VisionApiError::Status {
            status,
            code: env.error.status,
            message: env.error.message,
        },
        Err(_) => VisionApiError::Status {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

pub(crate) fn extract_text(resp: GenerateContentResponse) -> Result<String, VisionApiError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(VisionApiError::Blocked { reason });
    }

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| VisionApiError::Malformed("no candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match candidate.finish_reason {
        Some(reason) if POLICY_FINISH_REASONS.contains(&reason.as_str()) => Err(VisionApiError::Blocked { reason }),
        Some(reason) => Err(VisionApiError::Malformed(format!("empty response (finish reason {})", reason))),
        None => Err(VisionApiError::Malformed("empty response".to_string())),
    }
}
