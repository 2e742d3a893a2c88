use async_trait::async_trait;
use thiserror::Error;

use crate::models::types::PendingImage;

/// Failure surface of a vision model backend.
///
/// Structured variants carry whatever the upstream reported (HTTP status,
/// vendor status code, block reason) so callers can classify without
/// inspecting the message text. `Other` is for backends that only have a
/// message to offer.
#[derive(Debug, Error)]
pub enum VisionApiError {
    #[error("vision client construction failed: {0}")]
    Construction(String),

    #[error("vision api returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("response blocked: {reason}")]
    Blocked { reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}

/// Interface for a vision-capable language model.
///
/// Implementations must be thread-safe (`Send + Sync`). A single call sends
/// one user turn made of the prompt and the inline image, and yields the
/// model's text as-is.
#[async_trait]
pub trait VisionApi: Send + Sync {
    /// Describes `image` following `prompt`.
    async fn describe_image(&self, prompt: &str, image: &PendingImage) -> Result<String, VisionApiError>;

    /// Model identifier, used for provenance labels.
    fn model_name(&self) -> &str;
}
