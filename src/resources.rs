// ABOUTME: Shared server state handed to every route
// ABOUTME: Builds the database, auth, token, sync, analytics and webhook services once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! # Server Resources
//!
//! Expensive objects are created once at startup and shared through an
//! `Arc<ServerResources>` router state.

use std::sync::Arc;

use dreamy_core::errors::AppResult;
use tracing::{info, warn};

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::crypto::TokenCipher;
use crate::database::Database;
use crate::oauth2_client::{OAuth2Client, OAuth2Config};
use crate::providers::{StravaApi, StravaClient};
use crate::services::{AnalyticsService, OAuthFlow, SyncService, TokenManager};
use crate::webhooks::WebhookProcessor;

/// Everything a handler may need
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Storage
    pub database: Database,
    /// Bearer token validation
    pub auth: AuthManager,
    /// Strava OAuth endpoints
    pub oauth: Arc<OAuth2Client>,
    /// Strava token lifecycle
    pub tokens: Arc<TokenManager>,
    /// Connect and callback handling
    pub oauth_flow: OAuthFlow,
    /// Activity import
    pub sync: Arc<SyncService>,
    /// Training analytics
    pub analytics: AnalyticsService,
    /// Webhook event handling
    pub webhooks: WebhookProcessor,
}

impl ServerResources {
    /// Open the database and build services from configuration
    ///
    /// # Errors
    ///
    /// Returns a config error when secrets are missing in production or the
    /// encryption key is malformed, or a database error when the database
    /// cannot be opened
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database_url).await?;
        let cipher = TokenCipher::load_or_generate(
            config.token_encryption_key.as_deref(),
            config.environment,
        )?;
        let auth = AuthManager::load_or_generate(config.jwt_secret.as_deref(), config.environment)?;
        let api: Arc<dyn StravaApi> = Arc::new(StravaClient::new(config.strava.api_base.clone()));
        Ok(Self::with_components(config, database, cipher, auth, api))
    }

    /// Assemble resources from prepared parts
    ///
    /// Tests use this to inject an in-memory database and a fake Strava API.
    #[must_use]
    pub fn with_components(
        config: ServerConfig,
        database: Database,
        cipher: TokenCipher,
        auth: AuthManager,
        api: Arc<dyn StravaApi>,
    ) -> Self {
        let oauth_config = OAuth2Config::from_strava(&config.strava);
        if oauth_config.is_configured() {
            info!("Strava OAuth configured");
        } else {
            warn!("Strava OAuth credentials missing; connect and sync are unavailable");
        }
        let oauth = Arc::new(OAuth2Client::new(oauth_config));
        let tokens = Arc::new(TokenManager::new(
            database.clone(),
            Arc::new(cipher),
            Arc::clone(&oauth),
        ));
        let oauth_flow = OAuthFlow::new(database.clone(), Arc::clone(&oauth), Arc::clone(&tokens));
        let sync = Arc::new(SyncService::new(
            database.clone(),
            Arc::clone(&tokens),
            api,
            config.sync,
        ));
        let analytics =
            AnalyticsService::new(database.clone()).with_fitness_window(config.fitness_window_days);
        let webhooks = WebhookProcessor::new(
            database.clone(),
            Arc::clone(&tokens),
            Arc::clone(&sync),
            config.strava.subscription_id,
        );

        Self {
            config: Arc::new(config),
            database,
            auth,
            oauth,
            tokens,
            oauth_flow,
            sync,
            analytics,
            webhooks,
        }
    }
}
