// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every setting can be given as a command-line flag or an environment
//! variable (a `.env` file is loaded by `main` before parsing).

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::omr::{CommandEngine, CommandEngineConfig, OmrError, RemoteEngine, SharedEngine};

/// Default upload limit (25MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Default per-request engine deadline
pub const DEFAULT_PROCESS_TIMEOUT_SECS: u64 = 60;

/// Which OMR backend the node delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Run an external processor program for each sheet
    Command,
    /// Forward sheets to an upstream OMR service
    Remote,
}

/// Examflow OMR node
#[derive(Parser, Debug, Clone)]
#[command(name = "examflow-omr", version)]
#[command(about = "HTTP upload adapter for optical mark recognition", long_about = None)]
pub struct OmrNodeConfig {
    /// Interface to bind
    #[arg(long, env = "OMR_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "OMR_PORT", default_value_t = 8000)]
    pub port: u16,

    /// OMR backend
    #[arg(long, env = "OMR_ENGINE", value_enum, default_value_t = EngineKind::Command)]
    pub engine: EngineKind,

    /// Trained model weights used by the command engine
    #[arg(long, env = "MODEL_PATH", default_value = "./best.pt")]
    pub model_path: PathBuf,

    /// Processor program run by the command engine
    #[arg(long, env = "OMR_ENGINE_PROGRAM", default_value = "omr-processor")]
    pub engine_program: String,

    /// Whitespace-separated argument template; supports {model} and {image}
    #[arg(
        long,
        env = "OMR_ENGINE_ARGS",
        default_value = "--model {model} {image}",
        allow_hyphen_values = true
    )]
    pub engine_args: String,

    /// Base URL of the upstream service used by the remote engine
    #[arg(long, env = "OMR_API_URL", default_value = "http://localhost:8001")]
    pub upstream_url: String,

    /// Seconds an engine may spend on one sheet
    #[arg(long, env = "OMR_PROCESS_TIMEOUT_SECS", default_value_t = DEFAULT_PROCESS_TIMEOUT_SECS)]
    pub process_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "OMR_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Directory for temporary uploads (system temp dir when unset)
    #[arg(long, env = "OMR_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl OmrNodeConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    pub fn command_engine_config(&self) -> CommandEngineConfig {
        CommandEngineConfig {
            program: self.engine_program.clone(),
            args: self
                .engine_args
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            model_path: self.model_path.clone(),
        }
    }

    /// Runtime settings consumed by the HTTP layer
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            process_timeout: self.process_timeout(),
            max_upload_bytes: self.max_upload_bytes,
            temp_dir: self.temp_dir.clone(),
        }
    }

    /// Construct the process-wide engine
    ///
    /// Fails when the backend cannot be prepared (e.g. missing model weights),
    /// in which case the node must not start.
    pub fn build_engine(&self) -> Result<SharedEngine, OmrError> {
        let engine: SharedEngine = match self.engine {
            EngineKind::Command => Arc::new(CommandEngine::new(self.command_engine_config())?),
            EngineKind::Remote => {
                Arc::new(RemoteEngine::new(&self.upstream_url, self.process_timeout())?)
            }
        };
        Ok(engine)
    }
}

/// Settings shared with request handlers
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deadline for a single engine invocation
    pub process_timeout: Duration,
    /// Request body limit
    pub max_upload_bytes: usize,
    /// Where temp uploads are written
    pub temp_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            process_timeout: Duration::from_secs(DEFAULT_PROCESS_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            temp_dir: None,
        }
    }
}
