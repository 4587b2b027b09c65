// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::omr::OmrError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    PayloadTooLarge {
        limit: usize,
    },
    ServiceUnavailable(String),
    ProcessingFailed(String),
    UpstreamFailed {
        status: u16,
        message: String,
    },
    CleanupFailed(String),
    InternalError(String),
    Timeout {
        millis: u64,
    },
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::PayloadTooLarge { limit } => {
                let mut details = HashMap::new();
                details.insert(
                    "limit_bytes".to_string(),
                    serde_json::Value::Number((*limit as u64).into()),
                );
                (
                    "payload_too_large",
                    format!("Upload exceeds the {} byte limit", limit),
                    Some(details),
                )
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::ProcessingFailed(msg) => ("processing_error", msg.clone(), None),
            ApiError::UpstreamFailed { status, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "upstream_status".to_string(),
                    serde_json::Value::Number((*status).into()),
                );
                ("upstream_error", message.clone(), Some(details))
            }
            ApiError::CleanupFailed(msg) => ("cleanup_error", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
            ApiError::Timeout { millis } => {
                let mut details = HashMap::new();
                details.insert(
                    "timeout_ms".to_string(),
                    serde_json::Value::Number((*millis).into()),
                );
                (
                    "timeout",
                    "OMR processing timed out".to_string(),
                    Some(details),
                )
            }
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::ProcessingFailed(_)
            | ApiError::CleanupFailed(_)
            | ApiError::InternalError(_) => 500,
            ApiError::UpstreamFailed { .. } => 502,
            ApiError::Timeout { .. } => 504,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::PayloadTooLarge { limit } => {
                write!(f, "Upload exceeds the {} byte limit", limit)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::ProcessingFailed(msg) => write!(f, "OMR processing failed: {}", msg),
            ApiError::UpstreamFailed { status, message } => {
                write!(f, "Upstream OMR service returned {}: {}", status, message)
            }
            ApiError::CleanupFailed(msg) => write!(f, "Temp file cleanup failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Timeout { millis } => {
                write!(f, "OMR processing timed out after {}ms", millis)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<OmrError> for ApiError {
    fn from(err: OmrError) -> Self {
        match err {
            OmrError::Timeout(deadline) => ApiError::Timeout {
                millis: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            },
            OmrError::Upstream { status, body } => ApiError::UpstreamFailed {
                status,
                message: body,
            },
            OmrError::Transport(e) => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::ProcessingFailed(other.to_string()),
        }
    }
}

/// Error response wrapper carrying the request id into the JSON body
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl ApiErrorResponse {
    pub fn new(error: ApiError, request_id: Option<String>) -> Self {
        Self { error, request_id }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        Self::new(error, None)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.error.to_response(self.request_id);

        (status, Json(error_response)).into_response()
    }
}
