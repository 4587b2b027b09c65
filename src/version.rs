// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Examflow OMR node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-omr-upload-adapter-2026-10-17";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-17";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "process-omr",
    "multipart-upload",
    "scoped-temp-files",
    "command-engine",
    "remote-engine",
    "process-timeout",
    "health-check",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Examflow OMR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
