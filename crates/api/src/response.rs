//! Standardized API responses.

use axum::{
    extract::rejection::{BytesRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry::{HealthReport, MetricsSnapshot};
use tracking_core::{
    error::{DbErrorCode, ValidationErrorCode},
    limits::MAX_BATCH_SIZE_BYTES,
};

/// Success response for `POST /api/track`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    /// Events stored
    pub count: usize,
    pub timestamp: DateTime<Utc>,
    /// Per-event validation errors, absent when every event was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl TrackResponse {
    pub fn new(count: usize, errors: Vec<String>) -> Self {
        Self {
            success: true,
            count,
            timestamp: Utc::now(),
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub report: HealthReport,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error carrying an HTTP status and a coded body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::BAD_REQUEST,
            ValidationErrorCode::InvalidFormat.code(),
            msg,
        )
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            DbErrorCode::StoreFailed.code(),
            msg,
        )
    }

    pub fn validation(code: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", code).with_details(errors),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<tracking_core::Error> for ApiError {
    fn from(err: tracking_core::Error) -> Self {
        use tracking_core::Error;

        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            Error::ValidationWithCode { code, message, .. } => {
                ApiError::with_code(status, code, message)
            }
            Error::Database { code, message, .. } => ApiError::with_code(status, code, message),
            Error::Validation(_) | Error::MissingField(_) | Error::Serialization(_) => {
                ApiError::bad_request(err.to_string())
            }
            Error::Transport(_) | Error::Internal(_) => ApiError::internal(err.to_string()),
        }
    }
}

/// Malformed panel configuration.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Ingest body that could not be buffered, most often one over the
/// server's body limit.
impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::with_code(
                StatusCode::BAD_REQUEST,
                ValidationErrorCode::BatchTooLarge.code(),
                format!("payload exceeds {} byte limit", MAX_BATCH_SIZE_BYTES),
            )
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    }
}
