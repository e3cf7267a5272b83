// ABOUTME: Race result model and its input validation
// ABOUTME: Races are the highest-priority source for personal records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// An official race result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    /// Identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Event name
    pub name: String,
    /// Race distance in meters
    pub distance_meters: f64,
    /// Finish time in seconds
    pub finish_seconds: u32,
    /// Race day
    pub race_date: NaiveDate,
    /// Linked activity, when the race was also recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<Uuid>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields supplied when recording a race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceInput {
    /// Event name
    pub name: String,
    /// Race distance in meters
    pub distance_meters: f64,
    /// Finish time in seconds
    pub finish_seconds: u32,
    /// Race day
    pub race_date: NaiveDate,
    /// Linked activity
    #[serde(default)]
    pub activity_id: Option<Uuid>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl RaceInput {
    /// Validate a race entry
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for an empty name, a non-positive
    /// distance or time, or a race date in the future.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        if !self.distance_meters.is_finite() || self.distance_meters <= 0.0 {
            return Err(AppError::invalid_input("distance_meters must be > 0"));
        }
        if self.finish_seconds == 0 {
            return Err(AppError::invalid_input("finish_seconds must be > 0"));
        }
        if self.race_date > Utc::now().date_naive() {
            return Err(AppError::invalid_input("race_date must not be in the future"));
        }
        Ok(())
    }

    /// Build a stored race row
    #[must_use]
    pub fn into_race(self, user_id: Uuid) -> RaceResult {
        RaceResult {
            id: Uuid::new_v4(),
            user_id,
            name: self.name.trim().to_owned(),
            distance_meters: self.distance_meters,
            finish_seconds: self.finish_seconds,
            race_date: self.race_date,
            activity_id: self.activity_id,
            notes: self.notes,
        }
    }
}
