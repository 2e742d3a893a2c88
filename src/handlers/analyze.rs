use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use tracing::{error, info};

use crate::handlers::AppState;
use crate::handlers::error::ApiError;
use crate::models::mode::OperatingMode;
use crate::models::types::{AnalysisResult, AnalyzeRequest, PendingImage};

/// Label shown to clients for results produced by demo mode
pub const DEMO_AGENT_LABEL: &str = "DEMO MODE (Add API key for real analysis)";

/// Human-readable name of the backend that produced a result
pub fn provenance_label(mode: OperatingMode, model: Option<&str>) -> String {
    match mode {
        OperatingMode::Mock => DEMO_AGENT_LABEL.to_string(),
        OperatingMode::Live => format!("Gemini {}", model.unwrap_or("vision")),
    }
}

/// `POST /analyze` with a base64 JSON body
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(req) = payload?;
    info!(mime_type = %req.mime_type(), image_len = req.image.len(), "analyze: request received");
    let image = req.into_pending_image();
    describe(&state, &image).await.map(Json)
}

/// `POST /analyze-file` with a multipart upload
pub async fn analyze_file(
    State(state): State<AppState>,
    upload: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let mut multipart = upload?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest("File must be an image".to_string()));
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;

        info!(file_name = %file_name, mime_type = %content_type, size = bytes.len(), "analyze-file: upload received");
        let image = PendingImage::from_bytes(&bytes, content_type);
        return describe(&state, &image).await.map(Json);
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

async fn describe(state: &AppState, image: &PendingImage) -> Result<AnalysisResult, ApiError> {
    let analyzer = &state.analyzer;
    let description = analyzer.analyze_image(image, None).await.map_err(|e| {
        error!(kind = e.kind(), error = %e, "analyze: failed");
        ApiError::from(e)
    })?;
    info!(mode = %analyzer.mode(), "analyze: complete");

    Ok(AnalysisResult::builder()
        .description(description)
        .agent_used(provenance_label(analyzer.mode(), analyzer.model_name()))
        .build())
}
