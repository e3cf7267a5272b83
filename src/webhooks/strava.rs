// ABOUTME: Strava webhook subscription handshake and event dispatch
// ABOUTME: Maps athlete deauthorizations and activity changes onto connections and sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::collections::HashMap;
use std::sync::Arc;

use dreamy_core::errors::{AppError, AppResult, ErrorCode};
use dreamy_core::models::ActivitySource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::Database;
use crate::services::{SyncService, TokenManager};

/// Query string of the subscription validation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionChallenge {
    /// Always `subscribe`
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Token chosen when the subscription was created
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// Value to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Check a subscription validation request and return the challenge to echo
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when no verify token is configured, the mode
/// is not `subscribe`, or the token does not match
pub fn verify_subscription(
    query: &SubscriptionChallenge,
    expected_token: Option<&str>,
) -> AppResult<String> {
    let denied = || AppError::new(ErrorCode::PermissionDenied, "Webhook verification failed");

    let expected = expected_token.ok_or_else(denied)?;
    if query.mode.as_deref() != Some("subscribe") {
        return Err(denied());
    }
    let presented = query.verify_token.as_deref().ok_or_else(denied)?;
    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(denied());
    }
    query
        .challenge
        .clone()
        .ok_or_else(|| AppError::missing_field("hub.challenge"))
}

/// Event posted by Strava
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// `activity` or `athlete`
    pub object_type: String,
    /// Activity id, or athlete id for athlete events
    pub object_id: i64,
    /// `create`, `update` or `delete`
    pub aspect_type: String,
    /// Athlete who owns the object
    pub owner_id: i64,
    /// Push subscription the event belongs to
    pub subscription_id: i64,
    /// Epoch seconds
    pub event_time: i64,
    /// Changed fields, for updates
    #[serde(default)]
    pub updates: HashMap<String, Value>,
}

impl WebhookEvent {
    /// The athlete withdrew access to our application
    #[must_use]
    pub fn is_deauthorization(&self) -> bool {
        self.object_type == "athlete"
            && self.aspect_type == "update"
            && self.updates.get("authorized").is_some_and(|value| {
                matches!(value, Value::Bool(false))
                    || value.as_str().is_some_and(|s| s.eq_ignore_ascii_case("false"))
            })
    }
}

/// What processing an event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WebhookAction {
    /// Nothing to do
    Ignored {
        /// Why
        reason: String,
    },
    /// The athlete's connection was removed
    ConnectionRevoked {
        /// Affected user
        user_id: Uuid,
    },
    /// An activity was imported or refreshed
    ActivitySynced {
        /// Owner
        user_id: Uuid,
        /// Stored activity id
        activity_id: Uuid,
        /// Whether it was new
        created: bool,
    },
    /// A stored activity was removed
    ActivityDeleted {
        /// Owner
        user_id: Uuid,
        /// Whether a row existed
        deleted: bool,
    },
}

impl WebhookAction {
    fn ignored(reason: impl Into<String>) -> Self {
        Self::Ignored {
            reason: reason.into(),
        }
    }
}

/// Applies Strava events to local state
pub struct WebhookProcessor {
    database: Database,
    tokens: Arc<TokenManager>,
    sync: Arc<SyncService>,
    subscription_id: Option<i64>,
}

impl WebhookProcessor {
    /// Create a processor; events from other subscriptions are ignored when
    /// `subscription_id` is set
    #[must_use]
    pub fn new(
        database: Database,
        tokens: Arc<TokenManager>,
        sync: Arc<SyncService>,
        subscription_id: Option<i64>,
    ) -> Self {
        Self {
            database,
            tokens,
            sync,
            subscription_id,
        }
    }

    /// Process one event
    ///
    /// # Errors
    ///
    /// Returns token, API or database errors from the resulting action
    pub async fn process(&self, event: &WebhookEvent) -> AppResult<WebhookAction> {
        if let Some(expected) = self.subscription_id {
            if event.subscription_id != expected {
                debug!(
                    subscription_id = event.subscription_id,
                    "Ignoring event for another subscription"
                );
                return Ok(WebhookAction::ignored("subscription mismatch"));
            }
        }

        if event.is_deauthorization() {
            return Ok(match self.tokens.revoke_by_athlete(event.owner_id).await? {
                Some(user_id) => WebhookAction::ConnectionRevoked { user_id },
                None => WebhookAction::ignored("unknown athlete"),
            });
        }

        if event.object_type != "activity" {
            return Ok(WebhookAction::ignored(format!(
                "unhandled {} {} event",
                event.object_type, event.aspect_type
            )));
        }

        let Some(user_id) = self.tokens.user_for_athlete(event.owner_id).await? else {
            return Ok(WebhookAction::ignored("unknown athlete"));
        };

        match event.aspect_type.as_str() {
            "create" | "update" => {
                let outcome = self.sync.sync_activity(user_id, event.object_id).await?;
                Ok(WebhookAction::ActivitySynced {
                    user_id,
                    activity_id: outcome.id,
                    created: outcome.created,
                })
            }
            "delete" => {
                let deleted = self
                    .database
                    .delete_external_activity(
                        user_id,
                        ActivitySource::Strava,
                        &event.object_id.to_string(),
                    )
                    .await?;
                info!(%user_id, activity = event.object_id, deleted, "Strava activity deleted");
                Ok(WebhookAction::ActivityDeleted { user_id, deleted })
            }
            other => Ok(WebhookAction::ignored(format!("unhandled activity {other} event"))),
        }
    }
}
