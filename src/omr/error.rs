// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OMR engine error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while constructing or invoking an OMR engine
#[derive(Debug, Error)]
pub enum OmrError {
    #[error("Model weights not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to start OMR processor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OMR processor exited with status {status}: {stderr}")]
    ProcessFailed { status: i32, stderr: String },

    #[error("OMR processor produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("Upstream OMR service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream OMR service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OMR processing timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OmrError {
    /// Whether the engine gave up because the deadline expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, OmrError::Timeout(_))
    }
}
