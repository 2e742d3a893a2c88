use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::types::ErrorBody;
use crate::services::analyzer::AnalysisError;

/// Error returned by request handlers, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Analysis(AnalysisError),
    BadRequest(String),
    /// Request refused by an extractor, keeping the extractor's status
    Rejected(StatusCode, String),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Rejected(e.status(), format!("Invalid upload: {}", e.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::Analysis(e) => match e {
                AnalysisError::NoImage => StatusCode::BAD_REQUEST,
                AnalysisError::UpstreamQuota(_) => StatusCode::TOO_MANY_REQUESTS,
                AnalysisError::ContentPolicy(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AnalysisError::Configuration
                | AnalysisError::UpstreamAuth(_)
                | AnalysisError::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message for the client. Upstream details stay in the logs.
    pub fn detail(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Rejected(_, msg) => msg.clone(),
            ApiError::Analysis(e) => match e {
                AnalysisError::Configuration => {
                    "GEMINI_API_KEY not configured. Please add your API key to the .env file or set DEMO_MODE=true".to_string()
                }
                AnalysisError::NoImage => "No image has been set for analysis".to_string(),
                AnalysisError::UpstreamAuth(_) => {
                    "Invalid API key. Please check your GEMINI_API_KEY in the .env file".to_string()
                }
                AnalysisError::UpstreamQuota(_) => {
                    "API quota exceeded. Please check your Gemini API usage limits".to_string()
                }
                AnalysisError::ContentPolicy(_) => "Image content was flagged by safety filters".to_string(),
                AnalysisError::UpstreamTransport(_) => "Failed to analyze image".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_not_exposed() {
        let e = ApiError::from(AnalysisError::UpstreamTransport("dns failure for secret-host".to_string()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.detail(), "Failed to analyze image");
    }

    #[test]
    fn rejection_keeps_extractor_status() {
        let e = ApiError::Rejected(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".to_string());
        assert_eq!(e.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(e.detail(), "length limit exceeded");
    }

    #[test]
    fn quota_maps_to_too_many_requests() {
        let e = ApiError::from(AnalysisError::UpstreamQuota("x".to_string()));
        assert_eq!(e.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
