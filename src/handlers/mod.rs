pub mod analyze;
pub mod error;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::services::analyzer::ImageAnalyzer;
use crate::services::settings::AppConfig;

pub use error::ApiError;

/// Shared across routes. The analyzer is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<ImageAnalyzer>,
    pub config: Arc<AppConfig>,
}

/// Routes, CORS and body limits for the public API.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let max_image = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route(
            "/analyze",
            post(analyze::analyze).layer(DefaultBodyLimit::max(json_body_limit(max_image))),
        )
        .route(
            "/analyze-file",
            post(analyze::analyze_file).layer(DefaultBodyLimit::max(multipart_body_limit(max_image))),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Room for JSON keys, multipart headers and boundaries around the image
pub const ENVELOPE_ALLOWANCE: usize = 64 * 1024;

/// Body limit for `/analyze`: the image arrives base64-encoded, 4 bytes per 3.
pub fn json_body_limit(max_image: usize) -> usize {
    max_image.div_ceil(3).saturating_mul(4).saturating_add(ENVELOPE_ALLOWANCE)
}

/// Body limit for `/analyze-file`: the image arrives as raw bytes.
pub fn multipart_body_limit(max_image: usize) -> usize {
    max_image.saturating_add(ENVELOPE_ALLOWANCE)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(list))
}
