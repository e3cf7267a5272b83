// ABOUTME: Race result storage
// ABOUTME: Official results that take priority as personal records and fitness anchors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::RaceResult;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};

impl Database {
    pub(super) async fn migrate_races(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS race_results (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                distance_meters REAL NOT NULL CHECK (distance_meters > 0),
                finish_seconds INTEGER NOT NULL CHECK (finish_seconds > 0),
                race_date TEXT NOT NULL,
                activity_id TEXT REFERENCES activities(id) ON DELETE SET NULL,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_race_results_user_date ON race_results(user_id, race_date)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a race result
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn create_race(&self, race: &RaceResult) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO race_results (
                id, user_id, name, distance_meters, finish_seconds, race_date, activity_id, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(race.id.to_string())
        .bind(race.user_id.to_string())
        .bind(&race.name)
        .bind(race.distance_meters)
        .bind(i64::from(race.finish_seconds))
        .bind(race.race_date)
        .bind(race.activity_id.map(|id| id.to_string()))
        .bind(&race.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List a user's races, most recent first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn list_races(&self, user_id: Uuid) -> AppResult<Vec<RaceResult>> {
        let rows = sqlx::query(
            "SELECT * FROM race_results WHERE user_id = ? ORDER BY race_date DESC, created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_race).collect()
    }

    /// Get one race
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or the row is malformed
    pub async fn get_race(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<RaceResult>> {
        let row = sqlx::query("SELECT * FROM race_results WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_race(&row)).transpose()
    }

    /// Delete one race
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn delete_race(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM race_results WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_race(row: &SqliteRow) -> AppResult<RaceResult> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let activity_id: Option<String> = row.try_get("activity_id")?;
    let finish_seconds: i64 = row.try_get("finish_seconds")?;
    Ok(RaceResult {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        name: row.try_get("name")?,
        distance_meters: row.try_get("distance_meters")?,
        finish_seconds: u32::try_from(finish_seconds)
            .map_err(|_| AppError::database(format!("Invalid finish time {finish_seconds}")))?,
        race_date: row.try_get("race_date")?,
        activity_id: activity_id.as_deref().map(parse_uuid).transpose()?,
        notes: row.try_get("notes")?,
    })
}
