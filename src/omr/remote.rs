// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OMR engine that forwards sheets to an upstream OMR service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::engine::{OmrEngine, OmrResult};
use super::error::OmrError;
use super::truncate_text;

/// Multipart field the upstream service expects
const UPLOAD_FIELD: &str = "file";

/// Maximum upstream error body kept in error messages
const MAX_ERROR_BODY: usize = 1024;

/// Client for an upstream service exposing `POST /process-omr`
pub struct RemoteEngine {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteEngine {
    /// Create a new remote engine
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, OmrError> {
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!("Remote OMR engine configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Get the upstream base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// A client-side timeout is a deadline expiry, not an unreachable upstream
    fn request_error(&self, err: reqwest::Error) -> OmrError {
        if err.is_timeout() {
            warn!(
                "Upstream OMR service did not answer within {:?}",
                self.timeout
            );
            OmrError::Timeout(self.timeout)
        } else {
            OmrError::Transport(err)
        }
    }

    fn mime_for(image_path: &Path) -> &'static str {
        match image_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("bmp") => "image/bmp",
            Some("tif") | Some("tiff") => "image/tiff",
            _ => "image/jpeg",
        }
    }
}

#[async_trait]
impl OmrEngine for RemoteEngine {
    async fn process_omr(&self, image_path: &Path) -> Result<OmrResult, OmrError> {
        let bytes = tokio::fs::read(image_path).await?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string());

        debug!(
            "Forwarding {} bytes to {}/process-omr",
            bytes.len(),
            self.endpoint
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(Self::mime_for(image_path))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(format!("{}/process-omr", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_text(&response.text().await.unwrap_or_default(), MAX_ERROR_BODY);
            warn!("Upstream OMR service error: {} {}", status, body);
            return Err(OmrError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<OmrResult>()
            .await
            .map_err(|e| self.request_error(e))
    }

    fn name(&self) -> &str {
        "remote"
    }

    async fn health_check(&self) -> bool {
        match self.client.get(format!("{}/", self.endpoint)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Upstream OMR health check failed: {}", e);
                false
            }
        }
    }
}
