// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OMR engine backed by an external processor program
//!
//! Each request spawns the configured program with the model weights and the
//! image path, then parses its stdout as the JSON result. Argument templates may
//! use `{model}` and `{image}` placeholders; when no argument mentions
//! `{image}` the image path is appended last.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::engine::{OmrEngine, OmrResult};
use super::error::OmrError;
use super::truncate_text;

const MODEL_PLACEHOLDER: &str = "{model}";
const IMAGE_PLACEHOLDER: &str = "{image}";

/// Maximum stderr bytes kept in error messages
const MAX_STDERR_BYTES: usize = 2048;

/// Configuration for [`CommandEngine`]
#[derive(Debug, Clone)]
pub struct CommandEngineConfig {
    /// Program to execute (looked up on `PATH` if not absolute)
    pub program: String,
    /// Argument templates
    pub args: Vec<String>,
    /// Trained weights handed to the processor
    pub model_path: PathBuf,
}

impl Default for CommandEngineConfig {
    fn default() -> Self {
        Self {
            program: "omr-processor".to_string(),
            args: vec![
                "--model".to_string(),
                MODEL_PLACEHOLDER.to_string(),
                IMAGE_PLACEHOLDER.to_string(),
            ],
            model_path: PathBuf::from("./best.pt"),
        }
    }
}

pub struct CommandEngine {
    config: CommandEngineConfig,
}

impl CommandEngine {
    /// Build the engine, failing if the model weights are missing
    pub fn new(config: CommandEngineConfig) -> Result<Self, OmrError> {
        if !config.model_path.is_file() {
            return Err(OmrError::ModelNotFound(config.model_path.clone()));
        }

        info!(
            "Command OMR engine configured: program={}, model={}",
            config.program,
            config.model_path.display()
        );

        Ok(Self { config })
    }

    /// Expand argument templates for one invocation
    fn build_args(&self, image_path: &Path) -> Vec<String> {
        let model = self.config.model_path.to_string_lossy();
        let image = image_path.to_string_lossy();

        let mut saw_image = false;
        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                if arg.contains(IMAGE_PLACEHOLDER) {
                    saw_image = true;
                }
                arg.replace(MODEL_PLACEHOLDER, &model)
                    .replace(IMAGE_PLACEHOLDER, &image)
            })
            .collect();

        if !saw_image {
            args.push(image.into_owned());
        }
        args
    }

    fn truncate_stderr(stderr: &[u8]) -> String {
        truncate_text(String::from_utf8_lossy(stderr).trim(), MAX_STDERR_BYTES)
    }
}

#[async_trait]
impl OmrEngine for CommandEngine {
    async fn process_omr(&self, image_path: &Path) -> Result<OmrResult, OmrError> {
        let args = self.build_args(image_path);
        debug!("Running {} {:?}", self.config.program, args);

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OmrError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = Self::truncate_stderr(&output.stderr);
            warn!(
                "OMR processor failed ({}): {}",
                output.status.code().unwrap_or(-1),
                stderr
            );
            return Err(OmrError::ProcessFailed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| OmrError::InvalidOutput(e.to_string()))
    }

    fn name(&self) -> &str {
        "command"
    }

    async fn health_check(&self) -> bool {
        self.config.model_path.is_file()
    }
}
