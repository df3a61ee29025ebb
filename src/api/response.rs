//! Response types for the Payroll Engine API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP status codes, and the report response bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::ReportMonth;
use crate::report::{PayrollReport, ReportTable};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// True when the same request may succeed if retried.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let retryable = error.is_retryable();

        let (status, error) = match error {
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, format!("field: {}", field)),
            ),
            EngineError::DuplicateAttendance { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("DUPLICATE_ATTENDANCE", message),
            ),
            EngineError::DuplicateKey { .. } => {
                (StatusCode::CONFLICT, ApiError::new("DUPLICATE_KEY", message))
            }
            EngineError::InvalidStateTransition { status, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INVALID_STATE_TRANSITION",
                    message,
                    format!("current status: {}", status),
                ),
            ),
            EngineError::InvalidRange { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_RANGE", message))
            }
            EngineError::InvalidTaxConfiguration { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INVALID_TAX_CONFIGURATION", message),
            ),
            EngineError::StoreUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("STORE_UNAVAILABLE", message),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::Overflow { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("ARITHMETIC_OVERFLOW", message),
            ),
            EngineError::Export { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("EXPORT_ERROR", message),
            ),
        };

        ApiErrorResponse {
            status,
            error: ApiError { retryable, ..error },
        }
    }
}

/// Body of `GET /reports`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    /// The month reported on.
    pub month: ReportMonth,
    /// Summary, charts and details.
    #[serde(flatten)]
    pub report: PayrollReport,
}

/// Body of `GET /reports/export`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    /// The month exported.
    pub month: ReportMonth,
    /// Suggested file name for the rendered document.
    pub filename: String,
    /// The summary block followed by the three detail tables.
    pub tables: Vec<ReportTable>,
}
