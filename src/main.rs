// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use examflow_omr::{
    api::{start_server, AppState},
    config::{EngineKind, OmrNodeConfig},
    version,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads environment-backed flags
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = OmrNodeConfig::parse();

    println!("🚀 Starting Examflow OMR Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!("🔧 Features: {}", version::FEATURES.join(", "));
    println!();
    tracing::info!("{}", version::get_version_string());

    // The engine is built once and shared by every request
    println!("🧠 Initializing OMR engine ({:?})...", config.engine);
    let engine = config
        .build_engine()
        .context("failed to initialize OMR engine")?;

    if engine.health_check().await {
        println!("✅ OMR engine '{}' ready", engine.name());
    } else {
        println!(
            "⚠️  OMR engine '{}' reports not ready; requests may fail until it recovers",
            engine.name()
        );
    }

    let addr = config.listen_addr();
    let state = AppState::new(engine, config.server_config());

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("🎉 Examflow OMR Node is running");
    println!("{}", separator);
    match config.engine {
        EngineKind::Command => {
            println!("Engine:         {}", config.engine_program);
            println!("Model:          {}", config.model_path.display());
        }
        EngineKind::Remote => {
            println!("Upstream:       {}", config.upstream_url);
        }
    }
    println!("Timeout:        {}s", config.process_timeout_secs);
    println!("Upload limit:   {} bytes", config.max_upload_bytes);
    println!("\nAPI Endpoints:");
    println!("  Liveness:     http://localhost:{}/", addr.port());
    println!("  Health:       http://localhost:{}/health", addr.port());
    println!(
        "  Process OMR:  POST http://localhost:{}/process-omr",
        addr.port()
    );
    println!("\nTest with curl:");
    println!(
        "  curl -X POST -F 'file=@sheet.jpg' http://localhost:{}/process-omr",
        addr.port()
    );
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    start_server(state, addr)
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    println!("👋 Goodbye!");
    Ok(())
}
