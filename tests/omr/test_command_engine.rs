// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CommandEngine tests, using `sh` as a stand-in OMR processor
#![cfg(unix)]

use axum::http::StatusCode;
use examflow_omr::{
    api::create_app,
    omr::{CommandEngine, CommandEngineConfig, OmrEngine, OmrError},
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::common::{body_json, dir_is_empty, file_upload, server_config, state_with};

/// Write fake weights into `dir` and build a `sh -c <script>` engine
fn sh_engine(dir: &TempDir, script: &str, extra: &[&str]) -> (CommandEngine, PathBuf) {
    let model_path = dir.path().join("best.pt");
    std::fs::write(&model_path, b"weights").unwrap();

    let mut args = vec!["-c".to_string(), script.to_string(), "omr".to_string()];
    args.extend(extra.iter().map(|a| a.to_string()));

    let engine = CommandEngine::new(CommandEngineConfig {
        program: "sh".to_string(),
        args,
        model_path: model_path.clone(),
    })
    .unwrap();
    (engine, model_path)
}

#[tokio::test]
async fn test_stdout_json_is_result() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("sheet.jpg");
    std::fs::write(&image, b"sheet").unwrap();

    let (engine, _) = sh_engine(
        &dir,
        r#"test -f "$1" && printf '{"marks":[1,0,1],"bytes":%s}' "$(wc -c < "$1" | tr -d ' ')""#,
        &["{image}"],
    );

    let result = engine.process_omr(&image).await.unwrap();
    assert_eq!(result, json!({"marks": [1, 0, 1], "bytes": 5}));
}

#[tokio::test]
async fn test_model_path_passed_to_processor() {
    let dir = TempDir::new().unwrap();
    let (engine, model_path) = sh_engine(&dir, r#"printf '{"model":"%s"}' "$1""#, &["{model}"]);

    let result = engine.process_omr(Path::new("/tmp/sheet.jpg")).await.unwrap();
    assert_eq!(result["model"], model_path.to_str().unwrap());
}

#[tokio::test]
async fn test_image_appended_when_not_templated() {
    let dir = TempDir::new().unwrap();
    // Image arrives as $1 because no argument mentions {image}
    let (engine, _) = sh_engine(&dir, r#"printf '{"image":"%s"}' "$1""#, &[]);

    let result = engine.process_omr(Path::new("/tmp/sheet.png")).await.unwrap();
    assert_eq!(result["image"], "/tmp/sheet.png");
}

#[tokio::test]
async fn test_nonzero_exit_is_process_failure() {
    let dir = TempDir::new().unwrap();
    let (engine, _) = sh_engine(&dir, "echo 'sheet unreadable' >&2; exit 3", &[]);

    let err = engine
        .process_omr(Path::new("/tmp/sheet.jpg"))
        .await
        .unwrap_err();
    match err {
        OmrError::ProcessFailed { status, stderr } => {
            assert_eq!(status, 3);
            assert_eq!(stderr, "sheet unreadable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_stdout_is_invalid_output() {
    let dir = TempDir::new().unwrap();
    let (engine, _) = sh_engine(&dir, "echo 'done'", &[]);

    let err = engine
        .process_omr(Path::new("/tmp/sheet.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, OmrError::InvalidOutput(_)));
}

#[tokio::test]
async fn test_missing_program_is_spawn_error() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("best.pt");
    std::fs::write(&model_path, b"weights").unwrap();

    let engine = CommandEngine::new(CommandEngineConfig {
        program: "/nonexistent/omr-processor".to_string(),
        args: vec![],
        model_path,
    })
    .unwrap();

    let err = engine
        .process_omr(Path::new("/tmp/sheet.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, OmrError::Spawn { .. }));
}

#[tokio::test]
async fn test_health_tracks_model_file() {
    let dir = TempDir::new().unwrap();
    let (engine, model_path) = sh_engine(&dir, "true", &[]);
    assert!(engine.health_check().await);

    std::fs::remove_file(model_path).unwrap();
    assert!(!engine.health_check().await);
}

#[tokio::test]
async fn test_upload_through_command_engine() {
    let model_dir = TempDir::new().unwrap();
    let upload_dir = TempDir::new().unwrap();
    let (engine, _) = sh_engine(
        &model_dir,
        r#"printf '{"received":"%s"}' "$(cat "$1")""#,
        &["{image}"],
    );

    let app = create_app(state_with(engine, server_config(upload_dir.path())));
    let response = app
        .oneshot(file_upload("sheet.jpg", b"roll-42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"received": "roll-42"}));
    assert!(dir_is_empty(upload_dir.path()));
}

#[tokio::test]
async fn test_failing_processor_through_api() {
    let model_dir = TempDir::new().unwrap();
    let upload_dir = TempDir::new().unwrap();
    let (engine, _) = sh_engine(&model_dir, "echo 'bad sheet' >&2; exit 1", &[]);

    let app = create_app(state_with(engine, server_config(upload_dir.path())));
    let response = app
        .oneshot(file_upload("sheet.jpg", b"blurry"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(dir_is_empty(upload_dir.path()));
}
