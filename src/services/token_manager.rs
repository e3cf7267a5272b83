// ABOUTME: Strava token lifecycle: encrypted storage, refresh before expiry and revocation
// ABOUTME: Refreshes are serialized per user so concurrent requests rotate the pair once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use dreamy_core::constants::oauth::{REFRESH_MARGIN_SECS, STRAVA};
use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::{ConnectionStatus, StravaConnection};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::TokenCipher;
use crate::database::{Database, EncryptedConnection};
use crate::oauth2_client::{OAuth2Client, StravaToken};

/// Owns every read and write of Strava tokens
pub struct TokenManager {
    database: Database,
    cipher: Arc<TokenCipher>,
    oauth: Arc<OAuth2Client>,
    refresh_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    refresh_margin: Duration,
}

impl TokenManager {
    /// Create a manager with the default five minute refresh margin
    #[must_use]
    pub fn new(database: Database, cipher: Arc<TokenCipher>, oauth: Arc<OAuth2Client>) -> Self {
        Self {
            database,
            cipher,
            oauth,
            refresh_locks: DashMap::new(),
            refresh_margin: Duration::seconds(REFRESH_MARGIN_SECS),
        }
    }

    /// Override the refresh margin
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Encrypt and persist a connection
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database write fails
    pub async fn store_connection(&self, connection: &StravaConnection) -> AppResult<()> {
        let row = EncryptedConnection {
            user_id: connection.user_id,
            athlete_id: connection.athlete_id,
            access_token_encrypted: self
                .cipher
                .encrypt(&connection.access_token, connection.user_id)?,
            refresh_token_encrypted: self
                .cipher
                .encrypt(&connection.refresh_token, connection.user_id)?,
            expires_at: connection.expires_at,
            scope: connection.scope.clone(),
            last_synced_at: connection.last_synced_at,
            revoked_at: None,
        };
        self.database.upsert_connection(&row).await
    }

    /// Load and decrypt a user's connection
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` when the stored tokens no longer decrypt (for
    /// example after the encryption key changed), or a database error
    pub async fn load_connection(&self, user_id: Uuid) -> AppResult<Option<StravaConnection>> {
        let Some(row) = self.database.get_connection(user_id).await? else {
            return Ok(None);
        };
        self.decrypt_row(row).map(Some)
    }

    fn decrypt_row(&self, row: EncryptedConnection) -> AppResult<StravaConnection> {
        let decrypt = |value: &str| {
            self.cipher.decrypt(value, row.user_id).map_err(|_| {
                warn!(user_id = %row.user_id, "Stored Strava tokens cannot be decrypted");
                AppError::auth_expired("Strava connection must be re-established")
            })
        };
        Ok(StravaConnection {
            user_id: row.user_id,
            athlete_id: row.athlete_id,
            access_token: decrypt(&row.access_token_encrypted)?,
            refresh_token: decrypt(&row.refresh_token_encrypted)?,
            expires_at: row.expires_at,
            scope: row.scope,
            last_synced_at: row.last_synced_at,
            revoked_at: row.revoked_at,
        })
    }

    /// Store the token pair from a completed authorization
    ///
    /// # Errors
    ///
    /// Returns an external service error when Strava omitted the athlete, or
    /// a storage error
    pub async fn connect(
        &self,
        user_id: Uuid,
        token: StravaToken,
        scope: &str,
    ) -> AppResult<StravaConnection> {
        let athlete = token.athlete.ok_or_else(|| {
            AppError::external_service(STRAVA, "Token response did not include the athlete")
        })?;
        let previous_sync = self
            .database
            .get_connection(user_id)
            .await?
            .filter(|existing| existing.athlete_id == athlete.id)
            .and_then(|existing| existing.last_synced_at);

        let connection = StravaConnection {
            user_id,
            athlete_id: athlete.id,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_at,
            scope: scope.to_owned(),
            last_synced_at: previous_sync,
            revoked_at: None,
        };
        self.store_connection(&connection).await?;
        info!(%user_id, athlete_id = athlete.id, "Strava account connected");
        Ok(connection)
    }

    /// A valid access token for the user, refreshed when close to expiry
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` when the user has no connection
    /// - `AUTH_EXPIRED` when the connection is revoked or Strava rejects the refresh
    /// - rate limit or service errors from the token endpoint
    pub async fn access_token(&self, user_id: Uuid) -> AppResult<String> {
        let connection = self.usable_connection(user_id).await?;
        if !connection.needs_refresh(Utc::now(), self.refresh_margin) {
            return Ok(connection.access_token);
        }

        let lock = self
            .refresh_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another request may have refreshed while we waited
        let connection = self.usable_connection(user_id).await?;
        if !connection.needs_refresh(Utc::now(), self.refresh_margin) {
            return Ok(connection.access_token);
        }

        let token = match self.oauth.refresh(&connection.refresh_token).await {
            Ok(token) => token,
            Err(error) if error.is_auth_failure() => {
                warn!(%user_id, "Strava refused the refresh token; marking connection revoked");
                self.database
                    .mark_connection_revoked(user_id, Utc::now())
                    .await?;
                return Err(AppError::auth_expired(
                    "Strava access was revoked; reconnect your account",
                ));
            }
            Err(error) => return Err(error),
        };

        self.database
            .update_connection_tokens(
                user_id,
                &self.cipher.encrypt(&token.access_token, user_id)?,
                &self.cipher.encrypt(&token.refresh_token, user_id)?,
                token.expires_at,
            )
            .await?;
        info!(%user_id, expires_at = %token.expires_at, "Refreshed Strava access token");
        Ok(token.access_token)
    }

    async fn usable_connection(&self, user_id: Uuid) -> AppResult<StravaConnection> {
        let connection = self
            .load_connection(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Strava connection"))?;
        if connection.is_revoked() {
            return Err(AppError::auth_expired(
                "Strava access was revoked; reconnect your account",
            ));
        }
        Ok(connection)
    }

    /// Revoke at Strava (best effort) and delete the connection
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection cannot be read or deleted
    pub async fn disconnect(&self, user_id: Uuid) -> AppResult<bool> {
        match self.load_connection(user_id).await {
            Ok(Some(connection)) if !connection.is_revoked() => {
                if let Err(error) = self.oauth.deauthorize(&connection.access_token).await {
                    warn!(%user_id, %error, "Strava deauthorization failed; deleting connection anyway");
                }
            }
            Ok(_) => {}
            Err(error) if error.is_auth_failure() => {}
            Err(error) => return Err(error),
        }
        self.refresh_locks.remove(&user_id);
        let deleted = self.database.delete_connection(user_id).await?;
        if deleted {
            info!(%user_id, "Strava account disconnected");
        }
        Ok(deleted)
    }

    /// Token-free connection state
    ///
    /// # Errors
    ///
    /// Returns a database error if the lookup fails
    pub async fn status(&self, user_id: Uuid) -> AppResult<ConnectionStatus> {
        let Some(row) = self.database.get_connection(user_id).await? else {
            return Ok(ConnectionStatus::disconnected());
        };
        Ok(ConnectionStatus {
            connected: row.revoked_at.is_none(),
            athlete_id: Some(row.athlete_id),
            scope: Some(row.scope),
            expires_at: Some(row.expires_at),
            last_synced_at: row.last_synced_at,
            revoked: row.revoked_at.is_some(),
        })
    }

    /// User linked to a Strava athlete
    ///
    /// # Errors
    ///
    /// Returns a database error if the lookup fails
    pub async fn user_for_athlete(&self, athlete_id: i64) -> AppResult<Option<Uuid>> {
        Ok(self
            .database
            .get_connection_by_athlete(athlete_id)
            .await?
            .map(|row| row.user_id))
    }

    /// Drop the connection of an athlete who revoked access at Strava
    ///
    /// Returns the affected user, if any.
    ///
    /// # Errors
    ///
    /// Returns a database error if the lookup or delete fails
    pub async fn revoke_by_athlete(&self, athlete_id: i64) -> AppResult<Option<Uuid>> {
        let Some(user_id) = self.user_for_athlete(athlete_id).await? else {
            return Ok(None);
        };
        self.refresh_locks.remove(&user_id);
        self.database.delete_connection(user_id).await?;
        info!(%user_id, athlete_id, "Strava athlete deauthorized; connection removed");
        Ok(Some(user_id))
    }
}
