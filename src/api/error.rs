//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::pipeline::ScreeningError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Machine-readable hint for correcting the request, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
    /// Preview of the extracted text, set when no values were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("No lab values found")]
    NoValuesFound { preview: String },
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, suggestion, preview) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
                None,
                None,
            ),
            ApiError::UnsupportedFormat(detail) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                detail.clone(),
                Some("Resubmit the report as a PDF or plain-text document."),
                None,
            ),
            ApiError::NoValuesFound { preview } => (
                StatusCode::BAD_REQUEST,
                "NO_VALUES_FOUND",
                "No lab values could be extracted from the document.".to_string(),
                Some("Check that the document contains test names with numeric results."),
                Some(preview.clone()),
            ),
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Retry after {retry_after}s"),
                None,
                None,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                suggestion,
                preview,
            },
        };

        let mut response = (status, Json(body)).into_response();
        // Add retry-after header for rate limited responses
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<ScreeningError> for ApiError {
    fn from(err: ScreeningError) -> Self {
        match err {
            ScreeningError::MissingInput(detail) => ApiError::BadRequest(detail),
            ScreeningError::UnsupportedFormat(detail) => ApiError::UnsupportedFormat(detail),
            ScreeningError::NoValuesFound { preview } => ApiError::NoValuesFound { preview },
            ScreeningError::ExtractionFailure(detail) => {
                ApiError::Internal(format!("extraction failed: {detail}"))
            }
            ScreeningError::ExtractionTimeout => {
                ApiError::Internal("extraction timed out".into())
            }
            ScreeningError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
