// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OMR engine abstraction
//!
//! The engine is the collaborator that turns an answer-sheet image on disk into
//! a structured result. Its output schema is owned by the engine, so results are
//! carried as an opaque JSON value and forwarded to clients untouched.
//!
//! A single engine instance is built at startup and shared by every request
//! handler through `Arc<dyn OmrEngine>`. Implementations must therefore be
//! `Send + Sync` and safe to call concurrently.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::error::OmrError;

/// Result returned by an engine, passed through to the HTTP response verbatim
pub type OmrResult = serde_json::Value;

/// Capability required from an optical mark recognition backend
#[async_trait]
pub trait OmrEngine: Send + Sync {
    /// Process the answer sheet image stored at `image_path`
    async fn process_omr(&self, image_path: &Path) -> Result<OmrResult, OmrError>;

    /// Short backend name used in logs and health output
    fn name(&self) -> &str;

    /// Whether the backend is currently able to serve requests
    async fn health_check(&self) -> bool {
        true
    }
}

/// Shared handle to the process-wide engine
pub type SharedEngine = Arc<dyn OmrEngine>;

/// Run `process_omr` under a deadline, surfacing expiry as [`OmrError::Timeout`]
pub async fn process_with_deadline(
    engine: &dyn OmrEngine,
    image_path: &Path,
    deadline: Duration,
) -> Result<OmrResult, OmrError> {
    match tokio::time::timeout(deadline, engine.process_omr(image_path)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "OMR engine '{}' did not finish within {:?}",
                engine.name(),
                deadline
            );
            Err(OmrError::Timeout(deadline))
        }
    }
}
