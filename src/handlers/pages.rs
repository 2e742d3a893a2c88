use std::path::PathBuf;

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use tracing::warn;

use crate::handlers::AppState;
use crate::models::types::{HealthReport, now_timestamp};

pub const FALLBACK_PAGE: &str = "<h1>AI Image Analyzer API</h1><p>Upload an image to /analyze endpoint</p>";

/// `GET /` serves the upload page, or a stub when none is installed.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = state.config.server.static_dir.as_ref() {
        candidates.push(PathBuf::from(dir).join("index.html"));
    }
    candidates.push(PathBuf::from("index.html"));

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => return Html(content),
            Err(e) => warn!(path = %path.display(), error = %e, "index page unreadable"),
        }
    }
    Html(FALLBACK_PAGE.to_string())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let selection = state.analyzer.selection();
    Json(HealthReport {
        status: "OK".to_string(),
        message: format!("{} is running", state.config.app.name),
        framework: "axum".to_string(),
        ai_model: format!("Google Gemini ({})", state.config.gemini.model),
        description: state.config.app.description.clone(),
        version: state.config.app.version.clone(),
        api_key_configured: selection.credential_configured,
        mode: selection.mode,
        timestamp: now_timestamp(),
    })
}
