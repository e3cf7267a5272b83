// ABOUTME: Activity route handlers: listing, manual entry, edit and delete
// ABOUTME: Manual entries are validated before they reach storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use dreamy_core::constants::validation::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::{Activity, ActivityInput, ActivitySource, SportType};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{json_rejection, parse_date_bound, path_rejection, query_rejection};
use crate::database::ActivityFilter;
use crate::middleware::AuthenticatedUser;
use crate::resources::ServerResources;

/// Query parameters for `GET /api/activities`
#[derive(Debug, Default, Deserialize)]
pub struct ActivityListQuery {
    /// Earliest start (date or timestamp)
    pub from: Option<String>,
    /// Latest start (date or timestamp, dates are inclusive)
    pub to: Option<String>,
    /// Page size, 1 to 500
    pub limit: Option<u32>,
    /// Single sport
    pub sport: Option<SportType>,
    /// Only running sports
    #[serde(default)]
    pub runs_only: bool,
}

impl ActivityListQuery {
    /// Convert to a storage filter
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for unparseable dates, an inverted range, or a
    /// limit outside 1 to 500
    pub fn into_filter(self) -> AppResult<ActivityFilter> {
        let from = self
            .from
            .as_deref()
            .map(|value| parse_date_bound("from", value, false))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|value| parse_date_bound("to", value, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::invalid_input("from must not be after to"));
            }
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit == 0 || limit > MAX_LIST_LIMIT {
            return Err(AppError::invalid_input(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}"
            )));
        }
        Ok(ActivityFilter {
            from,
            to,
            sport: self.sport,
            runs_only: self.runs_only,
            limit: Some(limit),
        })
    }
}

/// Activity routes
pub struct ActivityRoutes;

impl ActivityRoutes {
    /// `/api/activities` and `/api/activities/:id`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/activities",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/activities/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        query: Result<Query<ActivityListQuery>, QueryRejection>,
    ) -> Result<Json<Vec<Activity>>, AppError> {
        let Query(query) = query.map_err(|e| query_rejection(&e))?;
        let filter = query.into_filter()?;
        let activities = resources
            .database
            .list_activities(auth.user_id, &filter)
            .await?;
        Ok(Json(activities))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        body: Result<Json<ActivityInput>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(input) = body.map_err(|e| json_rejection(&e))?;
        input.validate()?;
        let activity = input.into_activity(auth.user_id, ActivitySource::Manual, None);
        resources.database.create_activity(&activity).await?;
        info!(user_id = %auth.user_id, activity_id = %activity.id, "Manual activity created");
        Ok((StatusCode::CREATED, Json(activity)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        id: Result<Path<Uuid>, PathRejection>,
    ) -> Result<Json<Activity>, AppError> {
        let Path(id) = id.map_err(|e| path_rejection(&e))?;
        let activity = resources
            .database
            .get_activity(auth.user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))?;
        Ok(Json(activity))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        id: Result<Path<Uuid>, PathRejection>,
        body: Result<Json<ActivityInput>, JsonRejection>,
    ) -> Result<Json<Activity>, AppError> {
        let Path(id) = id.map_err(|e| path_rejection(&e))?;
        let Json(input) = body.map_err(|e| json_rejection(&e))?;
        input.validate()?;

        let existing = resources
            .database
            .get_activity(auth.user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))?;
        let updated = replace_fields(existing, input);

        if !resources.database.update_activity(&updated).await? {
            return Err(AppError::not_found("Activity"));
        }
        info!(user_id = %auth.user_id, activity_id = %id, "Activity updated");
        Ok(Json(updated))
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        id: Result<Path<Uuid>, PathRejection>,
    ) -> Result<StatusCode, AppError> {
        let Path(id) = id.map_err(|e| path_rejection(&e))?;
        if !resources.database.delete_activity(auth.user_id, id).await? {
            return Err(AppError::not_found("Activity"));
        }
        info!(user_id = %auth.user_id, activity_id = %id, "Activity deleted");
        Ok(StatusCode::NO_CONTENT)
    }
}

/// Apply an edit, keeping identity, provenance and best efforts
fn replace_fields(existing: Activity, input: ActivityInput) -> Activity {
    let replacement = input.into_activity(existing.user_id, existing.source, None);
    Activity {
        id: existing.id,
        external_id: existing.external_id,
        best_efforts: existing.best_efforts,
        created_at: existing.created_at,
        updated_at: Utc::now(),
        ..replacement
    }
}
