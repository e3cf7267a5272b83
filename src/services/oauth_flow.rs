// ABOUTME: Strava authorization flow orchestration behind the connect and callback routes
// ABOUTME: Issues single-use CSRF states and turns a callback into a stored connection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use chrono::{Duration, Utc};
use dreamy_core::constants::oauth::STATE_TTL_SECS;
use dreamy_core::errors::{AppError, AppResult, ErrorCode};
use dreamy_core::models::{scope_allows_activity_read, ConnectionStatus};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::token_manager::TokenManager;
use crate::database::Database;
use crate::oauth2_client::{generate_state, OAuth2Client};

/// Query parameters Strava appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,
    /// CSRF state issued by [`OAuthFlow::begin`]
    pub state: Option<String>,
    /// Scopes the athlete granted, comma separated
    pub scope: Option<String>,
    /// Set when the athlete denied access
    pub error: Option<String>,
}

/// Authorization-code flow for Strava
pub struct OAuthFlow {
    database: Database,
    oauth: Arc<OAuth2Client>,
    tokens: Arc<TokenManager>,
}

impl OAuthFlow {
    /// Create the flow
    #[must_use]
    pub fn new(database: Database, oauth: Arc<OAuth2Client>, tokens: Arc<TokenManager>) -> Self {
        Self {
            database,
            oauth,
            tokens,
        }
    }

    /// Store a fresh state for `user_id` and return the Strava authorization URL
    ///
    /// # Errors
    ///
    /// Returns a config error when Strava is not configured, or a database error
    pub async fn begin(&self, user_id: Uuid) -> AppResult<String> {
        let state = generate_state();
        let url = self.oauth.authorization_url(&state)?;
        let expires_at = Utc::now() + Duration::seconds(STATE_TTL_SECS);
        self.database
            .store_oauth_state(&state, user_id, expires_at)
            .await?;
        Ok(url)
    }

    /// Validate the callback, exchange the code and store the connection
    ///
    /// # Errors
    ///
    /// - `AUTH_INVALID` for a missing, unknown, expired or reused state
    /// - `PERMISSION_DENIED` when the athlete denied access or withheld activity scope
    /// - token exchange or storage errors
    pub async fn complete(&self, params: CallbackParams) -> AppResult<ConnectionStatus> {
        let state = params
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::auth_invalid("Missing OAuth state"))?;
        let user_id = self
            .database
            .consume_oauth_state(state, Utc::now())
            .await?
            .ok_or_else(|| AppError::auth_invalid("Unknown or expired OAuth state"))?;

        if let Some(error) = params.error {
            warn!(%user_id, %error, "Strava authorization denied");
            return Err(AppError::new(
                ErrorCode::PermissionDenied,
                format!("Strava authorization was not granted: {error}"),
            ));
        }

        let scope = params.scope.unwrap_or_default();
        if !scope_allows_activity_read(&scope) {
            return Err(AppError::new(
                ErrorCode::PermissionDenied,
                "Strava authorization must include activity:read or activity:read_all",
            ));
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::missing_field("code"))?;

        let token = self.oauth.exchange_code(code).await?;
        let connection = self.tokens.connect(user_id, token, &scope).await?;
        info!(%user_id, athlete_id = connection.athlete_id, "Strava authorization completed");
        Ok(connection.status())
    }
}
