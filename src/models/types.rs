use base64::{Engine, engine::general_purpose::STANDARD};
use bon::bon;
use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::models::mode::OperatingMode;

/// Mime type assumed when a JSON request does not name one
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// API token for the vision model. Never printed in full.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize, From)]
#[from(String, &str)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same token without surrounding whitespace or line breaks
    pub fn trimmed(&self) -> Self {
        Self(self.0.trim().to_string())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.chars().count())
    }
}

/// Image waiting to be analyzed: base64 body plus its mime type
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImage {
    pub data: String,
    pub mime_type: String,
}

impl PendingImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encodes raw upload bytes
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    /// `data:<mime>;base64,<body>` reference
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// JSON body of `POST /analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub image: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl AnalyzeRequest {
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn into_pending_image(self) -> PendingImage {
        let mime = self.mime_type().to_string();
        PendingImage::new(self.image, mime)
    }
}

/// Successful analysis as returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub description: String,
    pub timestamp: String,
    pub agent_used: String,
}

#[bon]
impl AnalysisResult {
    #[builder]
    pub fn new(description: String, agent_used: String, timestamp: Option<String>) -> Self {
        Self {
            success: true,
            description,
            timestamp: timestamp.unwrap_or_else(now_timestamp),
            agent_used,
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub message: String,
    pub framework: String,
    pub ai_model: String,
    pub description: String,
    pub version: String,
    pub api_key_configured: bool,
    pub mode: OperatingMode,
    pub timestamp: String,
}

/// Error body shared by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::from("AIzaSySecretValue");
        let printed = format!("{:?}", c);
        assert!(!printed.contains("Secret"));
        assert!(printed.contains("17 chars"));
    }

    #[test]
    fn pending_image_from_bytes_encodes_base64() {
        let img = PendingImage::from_bytes(b"foo", "image/png");
        assert_eq!(img.data, "Zm9v");
        assert_eq!(img.data_url(), "data:image/png;base64,Zm9v");
        assert!(!format!("{:?}", img).contains("Zm9v"));
    }

    #[test]
    fn analyze_request_defaults_mime_type() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"image":"Zm9v"}"#).unwrap();
        assert_eq!(req.mime_type(), "image/jpeg");
        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"image":"Zm9v","mime_type":null}"#).unwrap();
        assert_eq!(req.into_pending_image().mime_type, "image/jpeg");
    }

    #[test]
    fn analysis_result_is_marked_successful() {
        let r = AnalysisResult::builder()
            .description("a cat".to_string())
            .agent_used("mock".to_string())
            .timestamp("2024-01-01T00:00:00+00:00".to_string())
            .build();
        assert!(r.success);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["agent_used"], "mock");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00+00:00");
    }
}
