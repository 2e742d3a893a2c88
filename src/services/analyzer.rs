use bon::Builder;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::mode::OperatingMode;
use crate::models::types::PendingImage;
use crate::services::mock_responses::generate_mock_analysis;
use crate::services::mode_selector::ModeSelection;
use crate::traits::vision_api::VisionApiError;

/// Prompt sent with every live request that does not bring its own.
pub const DEFAULT_PROMPT: &str = "Analyze this image in detail and provide a comprehensive description. Include:

1. **Main Subject**: What is the primary focus of the image?
2. **Visual Elements**: Describe colors, composition, lighting, and style
3. **Context & Setting**: Where does this appear to be? What's the environment?
4. **Notable Details**: Any interesting or unique aspects worth mentioning
5. **Mood & Atmosphere**: What feeling or emotion does the image convey?

Please provide a well-structured, engaging description that captures all important aspects of the image.";

/// Why an analysis could not produce a description.
///
/// Upstream variants keep the backend's message for logging; it is not meant
/// for end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no API key configured and demo mode is disabled")]
    Configuration,
    #[error("No image has been set for analysis")]
    NoImage,
    #[error("credential rejected by upstream: {0}")]
    UpstreamAuth(String),
    #[error("upstream quota exhausted: {0}")]
    UpstreamQuota(String),
    #[error("content refused by upstream safety filters: {0}")]
    ContentPolicy(String),
    #[error("upstream analysis failed: {0}")]
    UpstreamTransport(String),
}

impl AnalysisError {
    /// Short machine-readable name of the category
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration => "configuration",
            AnalysisError::NoImage => "no_image",
            AnalysisError::UpstreamAuth(_) => "auth",
            AnalysisError::UpstreamQuota(_) => "quota",
            AnalysisError::ContentPolicy(_) => "content_policy",
            AnalysisError::UpstreamTransport(_) => "transport",
        }
    }
}

/// Maps a backend failure onto the user-facing taxonomy.
///
/// Structured fields (HTTP status, vendor status, block reason) decide first.
/// Message sniffing is only a fallback for errors that carry nothing else.
pub fn classify_vision_error(err: &VisionApiError) -> AnalysisError {
    let message = err.to_string();

    match err {
        VisionApiError::Blocked { .. } => return AnalysisError::ContentPolicy(message),
        VisionApiError::Status { status, code, .. } => {
            let code = code.as_deref().unwrap_or_default();
            if matches!(status, 401 | 403) || matches!(code, "UNAUTHENTICATED" | "PERMISSION_DENIED") {
                return AnalysisError::UpstreamAuth(message);
            }
            if *status == 429 || code == "RESOURCE_EXHAUSTED" {
                return AnalysisError::UpstreamQuota(message);
            }
        }
        _ => {}
    }

    if message.contains("API key") || message.contains("API_KEY_INVALID") {
        AnalysisError::UpstreamAuth(message)
    } else if message.to_lowercase().contains("quota") {
        AnalysisError::UpstreamQuota(message)
    } else if message.contains("SAFETY") {
        AnalysisError::ContentPolicy(message)
    } else {
        AnalysisError::UpstreamTransport(message)
    }
}

/// Turns a submitted image into a description using the backend chosen at
/// startup.
///
/// Keeps a single shared pending-image slot for callers that submit and
/// analyze in two steps (`set_image` then `analyze`). Concurrent callers of
/// that pair see each other's images. `analyze_image` takes the image as an
/// argument and does not touch the slot.
#[derive(Builder)]
pub struct ImageAnalyzer {
    selection: ModeSelection,
    #[builder(default = DEFAULT_PROMPT.to_string())]
    default_prompt: String,
    #[builder(default)]
    pending: Mutex<Option<PendingImage>>,
}

impl ImageAnalyzer {
    pub fn new(selection: ModeSelection) -> Self {
        Self::builder().selection(selection).build()
    }

    pub fn mode(&self) -> OperatingMode {
        self.selection.mode
    }

    pub fn selection(&self) -> &ModeSelection {
        &self.selection
    }

    /// Name of the live model, if one is wired in.
    pub fn model_name(&self) -> Option<&str> {
        self.selection.client.as_ref().map(|c| c.model_name())
    }

    /// Replaces the pending image. The payload is not decoded or validated.
    pub fn set_image(&self, data: impl Into<String>, mime_type: impl Into<String>) {
        let image = PendingImage::new(data, mime_type);
        debug!(mime_type = %image.mime_type, image_len = image.data.len(), "pending image replaced");
        *self.pending.lock() = Some(image);
    }

    pub fn current_image(&self) -> Option<PendingImage> {
        self.pending.lock().clone()
    }

    /// Analyzes whatever image is pending at the time of the call.
    pub async fn analyze(&self, custom_prompt: Option<&str>) -> Result<String, AnalysisError> {
        let image = self.current_image().ok_or(AnalysisError::NoImage)?;
        self.analyze_image(&image, custom_prompt).await
    }

    /// Analyzes `image` directly.
    pub async fn analyze_image(&self, image: &PendingImage, custom_prompt: Option<&str>) -> Result<String, AnalysisError> {
        if image.is_empty() {
            return Err(AnalysisError::NoImage);
        }
        if self.selection.is_unconfigured() {
            warn!("analysis requested without API key while demo mode is disabled");
            return Err(AnalysisError::Configuration);
        }

        match self.selection.mode {
            OperatingMode::Mock => {
                info!(mime_type = %image.mime_type, "analyze: demo mode, returning mock analysis");
                Ok(generate_mock_analysis().to_string())
            }
            OperatingMode::Live => {
                let client = self.selection.client.as_ref().ok_or(AnalysisError::Configuration)?;
                let prompt = custom_prompt
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or(self.default_prompt.as_str());
                info!(
                    mime_type = %image.mime_type,
                    image_len = image.data.len(),
                    custom_prompt = custom_prompt.is_some(),
                    "analyze: calling vision api"
                );
                let text = client.describe_image(prompt, image).await.map_err(|e| {
                    let classified = classify_vision_error(&e);
                    warn!(error = %e, kind = classified.kind(), "analyze: vision api failed");
                    classified
                })?;
                info!(response_len = text.len(), "analyze: done");
                Ok(text)
            }
        }
    }
}
