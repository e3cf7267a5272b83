// ABOUTME: Single-use OAuth CSRF state storage
// ABOUTME: A state maps back to the user who started the Strava authorization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{DateTime, Utc};
use dreamy_core::errors::AppResult;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};

impl Database {
    pub(super) async fn migrate_oauth_states(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS oauth_states (
                state TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remember a state value for `user_id`
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn store_oauth_state(
        &self,
        state: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO oauth_states (state, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(state)
            .bind(user_id.to_string())
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Consume a state value
    ///
    /// The row is deleted whether or not it has expired, so a state can only
    /// be presented once. Returns the owning user when the state was known
    /// and still valid at `now`.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails
    pub async fn consume_oauth_state(
        &self,
        state: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Uuid>> {
        let row = sqlx::query("DELETE FROM oauth_states WHERE state = ? RETURNING user_id, expires_at")
            .bind(state)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
        if expires_at <= now {
            return Ok(None);
        }
        let user_id: String = row.try_get("user_id")?;
        parse_uuid(&user_id).map(Some)
    }

    /// Drop states that expired before `now`
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn purge_expired_oauth_states(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
