// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Optical mark recognition backends
//!
//! This module provides:
//! - The `OmrEngine` capability consumed by the HTTP layer
//! - `CommandEngine`, which runs an external processor program per sheet
//! - `RemoteEngine`, which forwards sheets to an upstream OMR service
//! - `ScopedTempImage`, the per-request temp file handed to engines

pub mod command;
pub mod engine;
pub mod error;
pub mod remote;
pub mod temp_image;

pub use command::{CommandEngine, CommandEngineConfig};
pub use engine::{process_with_deadline, OmrEngine, OmrResult, SharedEngine};
pub use error::OmrError;
pub use remote::RemoteEngine;
pub use temp_image::{detect_format, suffix_for, ScopedTempImage};

/// Cut `text` to at most `max` bytes on a char boundary
pub(crate) fn truncate_text(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &text[..end])
}
