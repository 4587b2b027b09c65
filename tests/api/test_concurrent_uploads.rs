// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Concurrent upload tests for POST /process-omr
//!
//! Ten uploads in flight at once must each get the result for their own
//! content, through distinct temp files, with nothing left on disk.

use axum::http::StatusCode;
use examflow_omr::api::create_app;
use futures::future::join_all;
use std::collections::HashSet;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::common::{body_json, dir_is_empty, file_upload, server_config, state_with, EchoEngine};

const CONCURRENT_REQUESTS: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_get_their_own_results() {
    let dir = TempDir::new().unwrap();
    let app = create_app(state_with(EchoEngine, server_config(dir.path())));

    let requests = (0..CONCURRENT_REQUESTS).map(|i| {
        let app = app.clone();
        async move {
            let content = format!("answer-sheet-{:02}", i);
            let response = app
                .oneshot(file_upload(&format!("sheet-{}.jpg", i), content.as_bytes()))
                .await
                .unwrap();
            (content, response)
        }
    });

    let mut paths = HashSet::new();
    for (content, response) in join_all(requests).await {
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["content"], content);
        paths.insert(body["path"].as_str().unwrap().to_string());
    }

    assert_eq!(paths.len(), CONCURRENT_REQUESTS, "temp paths must not collide");
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_requests_share_engine() {
    let dir = TempDir::new().unwrap();
    let app = create_app(state_with(EchoEngine, server_config(dir.path())));

    let handles: Vec<_> = (0..CONCURRENT_REQUESTS)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let content = format!("spawned-{}", i);
                let response = app
                    .oneshot(file_upload("sheet.jpg", content.as_bytes()))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
                (content, body_json(response).await)
            })
        })
        .collect();

    for handle in handles {
        let (content, body) = handle.await.unwrap();
        assert_eq!(body["content"], content);
    }
    assert!(dir_is_empty(dir.path()));
}
