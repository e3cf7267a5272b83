// ABOUTME: HTTP server assembly and lifecycle
// ABOUTME: Layers request ids, tracing, timeouts and CORS over the routes and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware::from_fn;
use axum::Router;
use chrono::Utc;
use dreamy_core::constants::network::REQUEST_TIMEOUT_SECS;
use dreamy_core::errors::{AppError, AppResult};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::middleware::{request_id_middleware, setup_cors};
use crate::resources::ServerResources;
use crate::routes::api_routes;

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How often expired OAuth states are purged
const STATE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// The complete application router
pub fn router(resources: &Arc<ServerResources>) -> Router {
    api_routes(resources)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(&resources.config))
        .layer(from_fn(request_id_middleware))
}

/// Bind, serve and wait for Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns a config error for an unusable bind address, or an internal
/// error if the listener fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        resources.config.host, resources.config.http_port
    )
    .parse()
    .map_err(|e| AppError::config(format!("Invalid bind address: {e}")))?;

    let purge = tokio::spawn(purge_expired_states(Arc::clone(&resources)));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "Dreamy HTTP server listening");

    let result = axum::serve(listener, router(&resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")));

    purge.abort();
    info!("Dreamy HTTP server stopped");
    result
}

async fn purge_expired_states(resources: Arc<ServerResources>) {
    let mut interval = tokio::time::interval(STATE_PURGE_INTERVAL);
    loop {
        interval.tick().await;
        match resources
            .database
            .purge_expired_oauth_states(Utc::now())
            .await
        {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "Purged expired OAuth states"),
            Err(error) => warn!(%error, "Failed to purge expired OAuth states"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
