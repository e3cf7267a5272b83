// ABOUTME: Activity storage for manual entries and Strava imports
// ABOUTME: Splits and best efforts are JSON columns; Strava rows are unique per external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use chrono::{DateTime, Utc};
use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::{Activity, ActivitySource, SportType, WorkoutType};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::{parse_uuid, Database};

/// Filter for activity listings
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Earliest start, inclusive
    pub from: Option<DateTime<Utc>>,
    /// Latest start, inclusive
    pub to: Option<DateTime<Utc>>,
    /// Only this sport
    pub sport: Option<SportType>,
    /// Only running sports
    pub runs_only: bool,
    /// Maximum rows, newest first; `None` returns everything
    pub limit: Option<u32>,
}

/// Result of an external upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Stored activity id
    pub id: Uuid,
    /// Whether a new row was inserted
    pub created: bool,
}

const RUNNING_SPORTS: [SportType; 3] = [SportType::Run, SportType::TrailRun, SportType::Treadmill];

impl Database {
    pub(super) async fn migrate_activities(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                source TEXT NOT NULL CHECK (source IN ('manual', 'strava')),
                external_id TEXT,
                name TEXT NOT NULL,
                sport_type TEXT NOT NULL,
                workout_type TEXT NOT NULL,
                start_date TEXT NOT NULL,
                distance_meters REAL NOT NULL,
                moving_seconds INTEGER NOT NULL,
                elapsed_seconds INTEGER NOT NULL,
                elevation_gain REAL,
                average_heart_rate REAL,
                max_heart_rate REAL,
                perceived_effort INTEGER,
                splits TEXT NOT NULL DEFAULT '[]',
                best_efforts TEXT NOT NULL DEFAULT '[]',
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, source, external_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activities_user_start ON activities(user_id, start_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new activity
    ///
    /// # Errors
    ///
    /// Returns a conflict error if an external activity already exists, or a
    /// database error if the insert fails
    pub async fn create_activity(&self, activity: &Activity) -> AppResult<()> {
        let splits = serde_json::to_string(&activity.splits)?;
        let best_efforts = serde_json::to_string(&activity.best_efforts)?;
        sqlx::query(
            r"
            INSERT INTO activities (
                id, user_id, source, external_id, name, sport_type, workout_type, start_date,
                distance_meters, moving_seconds, elapsed_seconds, elevation_gain,
                average_heart_rate, max_heart_rate, perceived_effort, splits, best_efforts,
                notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(activity.id.to_string())
        .bind(activity.user_id.to_string())
        .bind(activity.source.as_str())
        .bind(&activity.external_id)
        .bind(&activity.name)
        .bind(activity.sport_type.as_str())
        .bind(activity.workout_type.as_str())
        .bind(activity.start_date)
        .bind(activity.distance_meters)
        .bind(i64::from(activity.moving_seconds))
        .bind(i64::from(activity.elapsed_seconds))
        .bind(activity.elevation_gain)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(activity.perceived_effort.map(i64::from))
        .bind(splits)
        .bind(best_efforts)
        .bind(&activity.notes)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get one of a user's activities
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn get_activity(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Activity>> {
        let row = sqlx::query("SELECT * FROM activities WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_activity(&row)).transpose()
    }

    /// Find an activity by its source and external id
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn get_activity_by_external(
        &self,
        user_id: Uuid,
        source: ActivitySource,
        external_id: &str,
    ) -> AppResult<Option<Activity>> {
        let row = sqlx::query(
            "SELECT * FROM activities WHERE user_id = ? AND source = ? AND external_id = ?",
        )
        .bind(user_id.to_string())
        .bind(source.as_str())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| row_to_activity(&row)).transpose()
    }

    /// List a user's activities, newest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn list_activities(
        &self,
        user_id: Uuid,
        filter: &ActivityFilter,
    ) -> AppResult<Vec<Activity>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM activities WHERE user_id = ");
        query.push_bind(user_id.to_string());
        if let Some(from) = filter.from {
            query.push(" AND start_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND start_date <= ").push_bind(to);
        }
        if let Some(sport) = filter.sport {
            query.push(" AND sport_type = ").push_bind(sport.as_str());
        } else if filter.runs_only {
            query.push(" AND sport_type IN (");
            let mut sports = query.separated(", ");
            for sport in RUNNING_SPORTS {
                sports.push_bind(sport.as_str());
            }
            query.push(")");
        }
        query.push(" ORDER BY start_date DESC");
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_activity).collect()
    }

    /// Replace the editable fields of an activity
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn update_activity(&self, activity: &Activity) -> AppResult<bool> {
        let splits = serde_json::to_string(&activity.splits)?;
        let result = sqlx::query(
            r"
            UPDATE activities SET
                name = ?, sport_type = ?, workout_type = ?, start_date = ?,
                distance_meters = ?, moving_seconds = ?, elapsed_seconds = ?,
                elevation_gain = ?, average_heart_rate = ?, max_heart_rate = ?,
                perceived_effort = ?, splits = ?, notes = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            ",
        )
        .bind(&activity.name)
        .bind(activity.sport_type.as_str())
        .bind(activity.workout_type.as_str())
        .bind(activity.start_date)
        .bind(activity.distance_meters)
        .bind(i64::from(activity.moving_seconds))
        .bind(i64::from(activity.elapsed_seconds))
        .bind(activity.elevation_gain)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(activity.perceived_effort.map(i64::from))
        .bind(splits)
        .bind(&activity.notes)
        .bind(activity.updated_at)
        .bind(activity.user_id.to_string())
        .bind(activity.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one of a user's activities
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn delete_activity(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or refresh an imported activity keyed by `(user, source, external_id)`
    ///
    /// On update the stored id, creation time, perceived effort and notes are
    /// kept, and splits or best efforts are only replaced when the incoming
    /// activity carries some.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when the activity has no external id,
    /// or a database error if a statement fails
    pub async fn upsert_external_activity(&self, activity: &Activity) -> AppResult<UpsertOutcome> {
        let external_id = activity
            .external_id
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("Imported activity has no external id"))?;

        let Some(existing) = self
            .get_activity_by_external(activity.user_id, activity.source, external_id)
            .await?
        else {
            self.create_activity(activity).await?;
            return Ok(UpsertOutcome {
                id: activity.id,
                created: true,
            });
        };

        let splits = if activity.splits.is_empty() {
            &existing.splits
        } else {
            &activity.splits
        };
        let best_efforts = if activity.best_efforts.is_empty() {
            &existing.best_efforts
        } else {
            &activity.best_efforts
        };

        sqlx::query(
            r"
            UPDATE activities SET
                name = ?, sport_type = ?, workout_type = ?, start_date = ?,
                distance_meters = ?, moving_seconds = ?, elapsed_seconds = ?,
                elevation_gain = ?, average_heart_rate = ?, max_heart_rate = ?,
                splits = ?, best_efforts = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&activity.name)
        .bind(activity.sport_type.as_str())
        .bind(activity.workout_type.as_str())
        .bind(activity.start_date)
        .bind(activity.distance_meters)
        .bind(i64::from(activity.moving_seconds))
        .bind(i64::from(activity.elapsed_seconds))
        .bind(activity.elevation_gain)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(serde_json::to_string(splits)?)
        .bind(serde_json::to_string(best_efforts)?)
        .bind(Utc::now())
        .bind(existing.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(UpsertOutcome {
            id: existing.id,
            created: false,
        })
    }

    /// Delete an imported activity by external id
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn delete_external_activity(
        &self,
        user_id: Uuid,
        source: ActivitySource,
        external_id: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM activities WHERE user_id = ? AND source = ? AND external_id = ?",
        )
        .bind(user_id.to_string())
        .bind(source.as_str())
        .bind(external_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn column_u32(row: &SqliteRow, column: &str) -> AppResult<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| AppError::database(format!("Column {column} out of range: {value}")))
}

fn row_to_activity(row: &SqliteRow) -> AppResult<Activity> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let source: String = row.try_get("source")?;
    let sport_type: String = row.try_get("sport_type")?;
    let workout_type: String = row.try_get("workout_type")?;
    let splits: String = row.try_get("splits")?;
    let best_efforts: String = row.try_get("best_efforts")?;
    let perceived_effort: Option<i64> = row.try_get("perceived_effort")?;

    Ok(Activity {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        source: ActivitySource::from_str(&source)?,
        external_id: row.try_get("external_id")?,
        name: row.try_get("name")?,
        sport_type: SportType::from_str(&sport_type)?,
        workout_type: WorkoutType::from_str(&workout_type)?,
        start_date: row.try_get("start_date")?,
        distance_meters: row.try_get("distance_meters")?,
        moving_seconds: column_u32(row, "moving_seconds")?,
        elapsed_seconds: column_u32(row, "elapsed_seconds")?,
        elevation_gain: row.try_get("elevation_gain")?,
        average_heart_rate: row.try_get("average_heart_rate")?,
        max_heart_rate: row.try_get("max_heart_rate")?,
        perceived_effort: perceived_effort.and_then(|rpe| u8::try_from(rpe).ok()),
        splits: serde_json::from_str(&splits)?,
        best_efforts: serde_json::from_str(&best_efforts)?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
