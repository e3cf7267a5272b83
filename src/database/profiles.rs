// ABOUTME: Athlete profile storage
// ABOUTME: One row per user holding heart rate and pace thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use chrono::{DateTime, Utc};
use dreamy_core::errors::AppResult;
use dreamy_core::models::{AthleteProfile, Sex};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};

impl Database {
    pub(super) async fn migrate_profiles(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS athlete_profiles (
                user_id TEXT PRIMARY KEY,
                display_name TEXT,
                sex TEXT CHECK (sex IN ('male', 'female')),
                birth_year INTEGER,
                max_heart_rate REAL,
                resting_heart_rate REAL,
                threshold_heart_rate REAL,
                threshold_pace_seconds_per_km REAL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a user's profile
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<AthleteProfile>> {
        let row = sqlx::query("SELECT * FROM athlete_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_profile(&row)).transpose()
    }

    /// Get a user's profile or an empty one
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get_profile_or_default(&self, user_id: Uuid) -> AppResult<AthleteProfile> {
        Ok(self
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| AthleteProfile::new(user_id)))
    }

    /// Insert or replace a profile
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails
    pub async fn upsert_profile(&self, profile: &AthleteProfile) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO athlete_profiles (
                user_id, display_name, sex, birth_year, max_heart_rate, resting_heart_rate,
                threshold_heart_rate, threshold_pace_seconds_per_km, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                sex = excluded.sex,
                birth_year = excluded.birth_year,
                max_heart_rate = excluded.max_heart_rate,
                resting_heart_rate = excluded.resting_heart_rate,
                threshold_heart_rate = excluded.threshold_heart_rate,
                threshold_pace_seconds_per_km = excluded.threshold_pace_seconds_per_km,
                updated_at = excluded.updated_at
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.display_name)
        .bind(profile.sex.map(Sex::as_str))
        .bind(profile.birth_year)
        .bind(profile.max_heart_rate)
        .bind(profile.resting_heart_rate)
        .bind(profile.threshold_heart_rate)
        .bind(profile.threshold_pace_seconds_per_km)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_profile(row: &SqliteRow) -> AppResult<AthleteProfile> {
    let user_id: String = row.try_get("user_id")?;
    let sex: Option<String> = row.try_get("sex")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(AthleteProfile {
        user_id: parse_uuid(&user_id)?,
        display_name: row.try_get("display_name")?,
        sex: sex.as_deref().map(Sex::from_str).transpose()?,
        birth_year: row.try_get("birth_year")?,
        max_heart_rate: row.try_get("max_heart_rate")?,
        resting_heart_rate: row.try_get("resting_heart_rate")?,
        threshold_heart_rate: row.try_get("threshold_heart_rate")?,
        threshold_pace_seconds_per_km: row.try_get("threshold_pace_seconds_per_km")?,
        updated_at,
    })
}
