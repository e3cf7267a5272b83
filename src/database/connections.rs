// ABOUTME: Strava connection storage with encrypted token columns
// ABOUTME: Rows are keyed by user and unique per Strava athlete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{DateTime, Utc};
use dreamy_core::errors::AppResult;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};

/// A connection row as stored, tokens still encrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedConnection {
    /// Owner
    pub user_id: Uuid,
    /// Strava athlete id
    pub athlete_id: i64,
    /// Ciphertext of the access token
    pub access_token_encrypted: String,
    /// Ciphertext of the refresh token
    pub refresh_token_encrypted: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// Granted scopes
    pub scope: String,
    /// Last successful sync
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Revocation time
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Database {
    pub(super) async fn migrate_connections(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS strava_connections (
                user_id TEXT PRIMARY KEY,
                athlete_id INTEGER NOT NULL UNIQUE,
                access_token_encrypted TEXT NOT NULL,
                refresh_token_encrypted TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                scope TEXT NOT NULL,
                last_synced_at TEXT,
                revoked_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or replace a user's connection
    ///
    /// Reconnecting clears any revocation. A connection held by another user
    /// for the same athlete is removed first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a statement fails
    pub async fn upsert_connection(&self, connection: &EncryptedConnection) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM strava_connections WHERE athlete_id = ? AND user_id != ?")
            .bind(connection.athlete_id)
            .bind(connection.user_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO strava_connections (
                user_id, athlete_id, access_token_encrypted, refresh_token_encrypted,
                expires_at, scope, last_synced_at, revoked_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, NULL)
            ON CONFLICT(user_id) DO UPDATE SET
                athlete_id = excluded.athlete_id,
                access_token_encrypted = excluded.access_token_encrypted,
                refresh_token_encrypted = excluded.refresh_token_encrypted,
                expires_at = excluded.expires_at,
                scope = excluded.scope,
                last_synced_at = excluded.last_synced_at,
                revoked_at = NULL
            ",
        )
        .bind(connection.user_id.to_string())
        .bind(connection.athlete_id)
        .bind(&connection.access_token_encrypted)
        .bind(&connection.refresh_token_encrypted)
        .bind(connection.expires_at)
        .bind(&connection.scope)
        .bind(connection.last_synced_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get a user's connection
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get_connection(&self, user_id: Uuid) -> AppResult<Option<EncryptedConnection>> {
        let row = sqlx::query("SELECT * FROM strava_connections WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_connection(&row)).transpose()
    }

    /// Get the connection for a Strava athlete
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get_connection_by_athlete(
        &self,
        athlete_id: i64,
    ) -> AppResult<Option<EncryptedConnection>> {
        let row = sqlx::query("SELECT * FROM strava_connections WHERE athlete_id = ?")
            .bind(athlete_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_connection(&row)).transpose()
    }

    /// Store a refreshed token pair
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn update_connection_tokens(
        &self,
        user_id: Uuid,
        access_token_encrypted: &str,
        refresh_token_encrypted: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE strava_connections
            SET access_token_encrypted = ?, refresh_token_encrypted = ?, expires_at = ?
            WHERE user_id = ?
            ",
        )
        .bind(access_token_encrypted)
        .bind(refresh_token_encrypted)
        .bind(expires_at)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Flag a connection as revoked
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn mark_connection_revoked(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE strava_connections SET revoked_at = ? WHERE user_id = ?")
            .bind(revoked_at)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a completed sync
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn touch_connection_sync(
        &self,
        user_id: Uuid,
        synced_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE strava_connections SET last_synced_at = ? WHERE user_id = ?")
            .bind(synced_at)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a user's connection
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn delete_connection(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM strava_connections WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_connection(row: &SqliteRow) -> AppResult<EncryptedConnection> {
    let user_id: String = row.try_get("user_id")?;
    Ok(EncryptedConnection {
        user_id: parse_uuid(&user_id)?,
        athlete_id: row.try_get("athlete_id")?,
        access_token_encrypted: row.try_get("access_token_encrypted")?,
        refresh_token_encrypted: row.try_get("refresh_token_encrypted")?,
        expires_at: row.try_get("expires_at")?,
        scope: row.try_get("scope")?,
        last_synced_at: row.try_get("last_synced_at")?,
        revoked_at: row.try_get("revoked_at")?,
    })
}
