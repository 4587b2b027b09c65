// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod omr;
pub mod version;

pub use api::{create_app, AppState};
pub use config::{EngineKind, OmrNodeConfig, ServerConfig};
pub use omr::{OmrEngine, OmrError, OmrResult, SharedEngine};
