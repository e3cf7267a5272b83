// ABOUTME: Athlete profile route handlers
// ABOUTME: Reads the profile with defaults and applies partial updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use dreamy_core::errors::AppError;
use dreamy_core::models::{AthleteProfile, ProfileUpdate};
use tracing::info;

use super::json_rejection;
use crate::middleware::AuthenticatedUser;
use crate::resources::ServerResources;

/// Profile routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// `GET`/`PUT /api/profile`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .with_state(resources)
    }

    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<AthleteProfile>, AppError> {
        let profile = resources
            .database
            .get_profile_or_default(auth.user_id)
            .await?;
        Ok(Json(profile))
    }

    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        body: Result<Json<ProfileUpdate>, JsonRejection>,
    ) -> Result<Json<AthleteProfile>, AppError> {
        let Json(update) = body.map_err(|e| json_rejection(&e))?;
        let mut profile = resources
            .database
            .get_profile_or_default(auth.user_id)
            .await?;
        profile.apply(update)?;
        resources.database.upsert_profile(&profile).await?;
        info!(user_id = %auth.user_id, "Profile updated");
        Ok(Json(profile))
    }
}
