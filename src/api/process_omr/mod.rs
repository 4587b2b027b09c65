// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OMR API endpoint module
//!
//! Provides POST /process-omr for scoring uploaded answer sheets.

pub mod handler;
pub mod request;

pub use handler::process_omr_handler;
pub use request::{OmrUpload, FILE_FIELD};
