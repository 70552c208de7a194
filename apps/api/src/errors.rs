use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::analysis::pipeline::PipelineFailure;

/// User-facing failure categories of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    UnsupportedFormat,
    ExtractionFailure,
}

impl ErrorCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorCategory::ExtractionFailure => "EXTRACTION_FAILURE",
        }
    }

    /// The single message shown to the user for this category.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCategory::UnsupportedFormat => "Please upload a PDF or DOCX file.",
            ErrorCategory::ExtractionFailure => "Could not extract text from file",
        }
    }
}

/// Errors raised inside the analysis pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Field inference failed: {0}")]
    InternalInference(String),
}

impl AnalysisError {
    /// Inference errors are reported the same way as extraction errors.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::UnsupportedFormat(_) => ErrorCategory::UnsupportedFormat,
            AnalysisError::ExtractionFailure(_) | AnalysisError::InternalInference(_) => {
                ErrorCategory::ExtractionFailure
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] PipelineFailure),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Multipart(e) => {
                tracing::debug!("Multipart error: {e}");
                (e.status(), "VALIDATION_ERROR", e.body_text())
            }
            AppError::Analysis(failure) => {
                let category = failure.error.category();
                let status = match category {
                    ErrorCategory::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ErrorCategory::ExtractionFailure => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, category.code(), category.message().to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
