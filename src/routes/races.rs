// ABOUTME: Race result route handlers
// ABOUTME: Races anchor fitness estimates and personal records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use dreamy_core::errors::AppError;
use dreamy_core::models::{RaceInput, RaceResult};
use tracing::info;
use uuid::Uuid;

use super::{json_rejection, path_rejection};
use crate::middleware::AuthenticatedUser;
use crate::resources::ServerResources;

/// Race routes
pub struct RaceRoutes;

impl RaceRoutes {
    /// `/api/races` and `/api/races/:id`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/races", get(Self::handle_list).post(Self::handle_create))
            .route("/api/races/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<Vec<RaceResult>>, AppError> {
        Ok(Json(resources.database.list_races(auth.user_id).await?))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        body: Result<Json<RaceInput>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(input) = body.map_err(|e| json_rejection(&e))?;
        input.validate()?;
        if let Some(activity_id) = input.activity_id {
            resources
                .database
                .get_activity(auth.user_id, activity_id)
                .await?
                .ok_or_else(|| AppError::not_found("Linked activity"))?;
        }

        let race = input.into_race(auth.user_id);
        resources.database.create_race(&race).await?;
        info!(user_id = %auth.user_id, race_id = %race.id, "Race result recorded");
        Ok((StatusCode::CREATED, Json(race)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        id: Result<Path<Uuid>, PathRejection>,
    ) -> Result<StatusCode, AppError> {
        let Path(id) = id.map_err(|e| path_rejection(&e))?;
        if !resources.database.delete_race(auth.user_id, id).await? {
            return Err(AppError::not_found("Race result"));
        }
        Ok(StatusCode::NO_CONTENT)
    }
}
