// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer-sheet upload extraction

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use crate::api::errors::ApiError;

/// Multipart field carrying the sheet image
pub const FILE_FIELD: &str = "file";

/// An uploaded answer-sheet image, read to completion
#[derive(Debug, Clone)]
pub struct OmrUpload {
    /// Client-supplied file name, if any
    pub file_name: Option<String>,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Raw image bytes (not inspected)
    pub bytes: Bytes,
}

impl OmrUpload {
    /// Read the `file` field from a multipart body
    ///
    /// Other fields are skipped. Only the first `file` field is used, and it
    /// must carry a filename.
    pub async fn from_multipart(
        multipart: &mut Multipart,
        max_upload_bytes: usize,
    ) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_upload_bytes))?
        {
            if field.name() != Some(FILE_FIELD) {
                debug!("Skipping multipart field {:?}", field.name());
                continue;
            }

            // A plain form value named `file` is not an upload
            let Some(file_name) = field.file_name().map(str::to_string) else {
                return Err(ApiError::ValidationError {
                    field: FILE_FIELD.to_string(),
                    message: "file must be an uploaded file".to_string(),
                });
            };
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_upload_bytes))?;

            return Ok(Self {
                file_name: Some(file_name),
                content_type,
                bytes,
            });
        }

        Err(ApiError::ValidationError {
            field: FILE_FIELD.to_string(),
            message: "file is required".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            limit: max_upload_bytes,
        }
    } else {
        ApiError::InvalidRequest(format!("Failed to read upload: {}", err))
    }
}
