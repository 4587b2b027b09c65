// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod process_omr;

pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use handlers::{HealthResponse, RootResponse, ROOT_MESSAGE};
pub use http_server::{create_app, start_server, AppState};
pub use process_omr::{process_omr_handler, OmrUpload};
