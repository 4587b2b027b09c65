// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer-sheet processing endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::request::OmrUpload;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::omr::{process_with_deadline, OmrResult, ScopedTempImage};

/// POST /process-omr - Run optical mark recognition on an uploaded sheet
///
/// Accepts `multipart/form-data` with a single file field named `file`. The
/// bytes are written to a per-request temp file, the shared engine processes
/// that file, and the engine's JSON result is returned unchanged.
///
/// The temp file is removed on every exit path. A deletion failure after a
/// successful run is reported as an error rather than hidden behind the result.
///
/// # Errors
/// - 400 Bad Request: body is not multipart, or the `file` field is missing
/// - 413 Payload Too Large: body exceeds the configured upload limit
/// - 500 Internal Server Error: engine failure or temp file cleanup failure
/// - 502 Bad Gateway: upstream OMR service rejected the sheet (remote engine)
/// - 503 Service Unavailable: upstream OMR service unreachable (remote engine)
/// - 504 Gateway Timeout: engine exceeded the processing deadline
pub async fn process_omr_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OmrResult>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let fail = |error: ApiError| ApiErrorResponse::new(error, Some(request_id.clone()));
    let config = &state.config;

    // 1. Read the upload to completion
    let mut multipart = multipart.map_err(|e| {
        warn!("[{}] Rejected upload: {}", request_id, e.body_text());
        fail(ApiError::InvalidRequest(e.body_text()))
    })?;

    let upload = OmrUpload::from_multipart(&mut multipart, config.max_upload_bytes)
        .await
        .map_err(|e| {
            warn!("[{}] Upload failed: {}", request_id, e);
            fail(e)
        })?;

    debug!(
        "[{}] Received {:?} ({} bytes, {:?})",
        request_id,
        upload.file_name,
        upload.len(),
        upload.content_type
    );

    // 2. Materialise it for the engine
    let temp = ScopedTempImage::create_async(config.temp_dir.clone(), upload.bytes)
        .await
        .map_err(|e| {
            error!("[{}] Failed to write temp upload: {}", request_id, e);
            fail(ApiError::InternalError(format!(
                "Failed to store upload: {}",
                e
            )))
        })?;

    // 3. Delegate, then release the temp file whatever the outcome
    let start = Instant::now();
    let processed =
        process_with_deadline(state.engine.as_ref(), temp.path(), config.process_timeout).await;
    let elapsed_ms = start.elapsed().as_millis();
    let cleaned = temp.close_async().await;

    match (processed, cleaned) {
        (Ok(result), Ok(())) => {
            info!(
                "[{}] OMR complete via {} engine in {}ms",
                request_id,
                state.engine.name(),
                elapsed_ms
            );
            Ok(Json(result))
        }
        (Ok(_), Err(e)) => {
            error!("[{}] Temp upload cleanup failed: {}", request_id, e);
            Err(fail(ApiError::CleanupFailed(e.to_string())))
        }
        (Err(e), cleaned) => {
            if let Err(cleanup) = cleaned {
                error!("[{}] Temp upload cleanup failed: {}", request_id, cleanup);
            }
            if e.is_timeout() {
                warn!("[{}] OMR processing timed out: {}", request_id, e);
            } else {
                warn!(
                    "[{}] OMR processing failed after {}ms: {}",
                    request_id, elapsed_ms, e
                );
            }
            Err(fail(ApiError::from(e)))
        }
    }
}
