// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Liveness endpoint tests for GET /

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use examflow_omr::api::create_app;
use serde_json::json;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::common::{body_json, server_config, state_with, MockEngine};

#[tokio::test]
async fn test_root_returns_fixed_message() {
    let dir = TempDir::new().unwrap();
    // No expectations: any engine call would panic
    let app = create_app(state_with(MockEngine::new(), server_config(dir.path())));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "OMR Processor API is running"})
    );
}

#[tokio::test]
async fn test_root_ignores_unhealthy_engine() {
    let dir = TempDir::new().unwrap();
    let mut engine = MockEngine::new();
    engine.expect_health_check().never();
    engine.expect_process_omr().never();

    let app = create_app(state_with(engine, server_config(dir.path())));

    for _ in 0..3 {
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_root_rejects_post() {
    let dir = TempDir::new().unwrap();
    let app = create_app(state_with(MockEngine::new(), server_config(dir.path())));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
