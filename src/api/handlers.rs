// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::version;

/// Fixed liveness acknowledgment
pub const ROOT_MESSAGE: &str = "OMR Processor API is running";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// GET / - liveness probe, never touches the engine
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// GET /health - engine readiness, always 200 so it never fails liveness
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut issues = Vec::new();

    if !state.engine.health_check().await {
        issues.push(format!("OMR engine '{}' is not ready", state.engine.name()));
    }

    let status = if issues.is_empty() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        engine: state.engine.name().to_string(),
        version: version::VERSION_NUMBER.to_string(),
        issues: if issues.is_empty() {
            None
        } else {
            Some(issues)
        },
    })
}
