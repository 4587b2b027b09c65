// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, root_handler};
use super::process_omr::process_omr_handler;
use crate::config::ServerConfig;
use crate::omr::SharedEngine;

/// State shared by every request handler
///
/// The engine is built once at startup; handlers only ever borrow it.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(engine: SharedEngine, config: ServerConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }
}

/// Cross-origin policy: any origin, method and header, with credentials
///
/// Browsers reject `*` alongside credentials, so the request's own origin,
/// method and headers are echoed back instead.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Liveness
        .route("/", get(root_handler))
        // Engine readiness
        .route("/health", get(health_handler))
        // Answer-sheet processing
        .route("/process-omr", post(process_omr_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("OMR API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("OMR API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
