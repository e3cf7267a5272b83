// ABOUTME: Strava connection route handlers: connect, callback, status, sync and disconnect
// ABOUTME: The callback authenticates through the stored OAuth state instead of a bearer token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use dreamy_core::errors::AppError;
use dreamy_core::models::ConnectionStatus;
use serde::Serialize;

use super::query_rejection;
use crate::middleware::AuthenticatedUser;
use crate::resources::ServerResources;
use crate::services::{CallbackParams, SyncReport};

/// Response of `GET /api/strava/connect`
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Where to send the athlete
    pub authorization_url: String,
}

/// Response of `DELETE /api/strava/connection`
#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    /// Whether a connection existed
    pub disconnected: bool,
}

/// Strava routes
pub struct StravaRoutes;

impl StravaRoutes {
    /// Connection management plus the OAuth callback
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/strava/connect", get(Self::handle_connect))
            .route("/strava/callback", get(Self::handle_callback))
            .route("/api/strava/status", get(Self::handle_status))
            .route("/api/strava/sync", post(Self::handle_sync))
            .route("/api/strava/connection", delete(Self::handle_disconnect))
            .with_state(resources)
    }

    async fn handle_connect(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<ConnectResponse>, AppError> {
        let authorization_url = resources.oauth_flow.begin(auth.user_id).await?;
        Ok(Json(ConnectResponse { authorization_url }))
    }

    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        params: Result<Query<CallbackParams>, QueryRejection>,
    ) -> Result<Json<ConnectionStatus>, AppError> {
        let Query(params) = params.map_err(|e| query_rejection(&e))?;
        Ok(Json(resources.oauth_flow.complete(params).await?))
    }

    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<ConnectionStatus>, AppError> {
        Ok(Json(resources.tokens.status(auth.user_id).await?))
    }

    async fn handle_sync(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<SyncReport>, AppError> {
        Ok(Json(resources.sync.sync_user(auth.user_id).await?))
    }

    async fn handle_disconnect(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<DisconnectResponse>, AppError> {
        let disconnected = resources.tokens.disconnect(auth.user_id).await?;
        Ok(Json(DisconnectResponse { disconnected }))
    }
}
