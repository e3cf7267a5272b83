// ABOUTME: Strava webhook endpoint: subscription validation and event intake
// ABOUTME: Events are acknowledged at once and processed on a background task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use dreamy_core::errors::AppError;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::query_rejection;
use crate::resources::ServerResources;
use crate::webhooks::{verify_subscription, SubscriptionChallenge, WebhookEvent};

/// Webhook routes
pub struct WebhookRoutes;

impl WebhookRoutes {
    /// `GET`/`POST /webhooks/strava`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/webhooks/strava",
                get(Self::handle_validation).post(Self::handle_event),
            )
            .with_state(resources)
    }

    async fn handle_validation(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<SubscriptionChallenge>, QueryRejection>,
    ) -> Result<Json<Value>, AppError> {
        let Query(query) = query.map_err(|e| query_rejection(&e))?;
        let challenge = verify_subscription(
            &query,
            resources.config.strava.webhook_verify_token.as_deref(),
        )
        .inspect_err(|_| warn!("Rejected Strava webhook subscription validation"))?;
        info!("Strava webhook subscription validated");
        Ok(Json(json!({ "hub.challenge": challenge })))
    }

    async fn handle_event(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<WebhookEvent>, JsonRejection>,
    ) -> StatusCode {
        let event = match body {
            Ok(Json(event)) => event,
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "Discarding malformed Strava webhook event");
                return StatusCode::OK;
            }
        };
        debug!(
            object_type = %event.object_type,
            aspect_type = %event.aspect_type,
            object_id = event.object_id,
            owner_id = event.owner_id,
            "Strava webhook event received"
        );

        tokio::spawn(async move {
            match resources.webhooks.process(&event).await {
                Ok(action) => debug!(?action, "Strava webhook event processed"),
                Err(error) => warn!(
                    %error,
                    object_id = event.object_id,
                    owner_id = event.owner_id,
                    "Strava webhook event failed"
                ),
            }
        });
        StatusCode::OK
    }
}
