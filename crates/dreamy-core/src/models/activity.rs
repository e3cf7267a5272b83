// ABOUTME: Activity models including splits, best efforts and manual-entry input
// ABOUTME: Validation rules for manual activities live next to the input type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActivitySource, SportType, WorkoutType};
use crate::constants::{heart_rate, validation};
use crate::errors::{AppError, AppResult};
use crate::units::METERS_PER_KM;

/// One split (usually one kilometer) of an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// 1-based position within the activity
    pub index: u32,
    /// Distance covered in meters
    pub distance_meters: f64,
    /// Wall-clock seconds
    pub elapsed_seconds: u32,
    /// Seconds spent moving
    pub moving_seconds: u32,
    /// Average heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    /// Net elevation change in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_difference: Option<f64>,
}

impl Split {
    /// Moving time, falling back to elapsed time when moving time is missing
    #[must_use]
    pub const fn effective_seconds(&self) -> u32 {
        if self.moving_seconds > 0 {
            self.moving_seconds
        } else {
            self.elapsed_seconds
        }
    }

    /// Average speed in m/s
    #[must_use]
    pub fn speed(&self) -> Option<f64> {
        let seconds = self.effective_seconds();
        (seconds > 0 && self.distance_meters > 0.0)
            .then(|| self.distance_meters / f64::from(seconds))
    }

    /// Pace in seconds per kilometer
    #[must_use]
    pub fn pace_seconds_per_km(&self) -> Option<f64> {
        self.speed().map(|v| METERS_PER_KM / v)
    }

    /// Grade as a fraction (0.03 is 3 %), zero when elevation is unknown
    #[must_use]
    pub fn grade(&self) -> f64 {
        match self.elevation_difference {
            Some(rise) if self.distance_meters > 0.0 => rise / self.distance_meters,
            _ => 0.0,
        }
    }
}

/// Fastest segment of a standard distance inside an activity, as reported by Strava
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEffort {
    /// Strava's label ("5k", "1 mile", ...)
    pub name: String,
    /// Distance in meters
    pub distance_meters: f64,
    /// Time for the distance in seconds
    pub elapsed_seconds: u32,
    /// When the effort started
    pub start_date: DateTime<Utc>,
    /// Owning activity, filled in when read from storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<Uuid>,
}

/// A stored activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Origin of the row
    pub source: ActivitySource,
    /// Provider identifier for imported rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Title
    pub name: String,
    /// Kind of activity
    pub sport_type: SportType,
    /// Purpose of the session
    pub workout_type: WorkoutType,
    /// Start time (UTC)
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_seconds: u32,
    /// Elapsed time in seconds
    pub elapsed_seconds: u32,
    /// Total climb in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Average heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    /// Maximum heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<f64>,
    /// Session RPE, 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perceived_effort: Option<u8>,
    /// Per-kilometer splits
    #[serde(default)]
    pub splits: Vec<Split>,
    /// Strava best efforts
    #[serde(default)]
    pub best_efforts: Vec<BestEffort>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Average speed in m/s over moving time
    #[must_use]
    pub fn average_speed(&self) -> Option<f64> {
        (self.moving_seconds > 0 && self.distance_meters > 0.0)
            .then(|| self.distance_meters / f64::from(self.moving_seconds))
    }

    /// Average pace in seconds per kilometer
    #[must_use]
    pub fn pace_seconds_per_km(&self) -> Option<f64> {
        self.average_speed().map(|v| METERS_PER_KM / v)
    }

    /// Moving time in hours
    #[must_use]
    pub fn hours(&self) -> f64 {
        f64::from(self.moving_seconds) / 3600.0
    }

    /// Whether the activity counts for running analytics
    #[must_use]
    pub const fn is_run(&self) -> bool {
        self.sport_type.is_running()
    }
}

/// Fields supplied when creating or replacing an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    /// Title
    pub name: String,
    /// Kind of activity
    #[serde(default)]
    pub sport_type: SportType,
    /// Purpose of the session
    #[serde(default)]
    pub workout_type: WorkoutType,
    /// Start time (UTC)
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_seconds: u32,
    /// Elapsed time in seconds, defaults to moving time
    #[serde(default)]
    pub elapsed_seconds: Option<u32>,
    /// Total climb in meters
    #[serde(default)]
    pub elevation_gain: Option<f64>,
    /// Average heart rate in BPM
    #[serde(default)]
    pub average_heart_rate: Option<f64>,
    /// Maximum heart rate in BPM
    #[serde(default)]
    pub max_heart_rate: Option<f64>,
    /// Session RPE, 1-10
    #[serde(default)]
    pub perceived_effort: Option<u8>,
    /// Splits, indexed from 1
    #[serde(default)]
    pub splits: Vec<Split>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl ActivityInput {
    /// Validate a manually entered activity
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error naming the first offending field.
    pub fn validate(&self) -> AppResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        if name.chars().count() > validation::MAX_NAME_LENGTH {
            return Err(AppError::invalid_input(format!(
                "name must be at most {} characters",
                validation::MAX_NAME_LENGTH
            )));
        }
        if !self.distance_meters.is_finite() || self.distance_meters < 0.0 {
            return Err(AppError::invalid_input("distance_meters must be >= 0"));
        }
        if self.moving_seconds == 0 {
            return Err(AppError::invalid_input("moving_seconds must be > 0"));
        }
        if self.moving_seconds > validation::MAX_DURATION_SECONDS
            || self.elapsed_seconds.unwrap_or(0) > validation::MAX_DURATION_SECONDS
        {
            return Err(AppError::invalid_input(format!(
                "activity duration must be at most {} seconds",
                validation::MAX_DURATION_SECONDS
            )));
        }
        if let Some(elapsed) = self.elapsed_seconds {
            if elapsed < self.moving_seconds {
                return Err(AppError::invalid_input(
                    "elapsed_seconds must not be less than moving_seconds",
                ));
            }
        }
        validate_heart_rate("average_heart_rate", self.average_heart_rate)?;
        validate_heart_rate("max_heart_rate", self.max_heart_rate)?;
        if let (Some(avg), Some(max)) = (self.average_heart_rate, self.max_heart_rate) {
            if avg > max {
                return Err(AppError::invalid_input(
                    "average_heart_rate must not exceed max_heart_rate",
                ));
            }
        }
        if let Some(rpe) = self.perceived_effort {
            if !(validation::MIN_RPE..=validation::MAX_RPE).contains(&rpe) {
                return Err(AppError::invalid_input("perceived_effort must be 1-10"));
            }
        }
        for (position, split) in self.splits.iter().enumerate() {
            let expected = u32::try_from(position + 1)
                .map_err(|_| AppError::invalid_input("too many splits"))?;
            if split.index != expected {
                return Err(AppError::invalid_input(format!(
                    "splits must be numbered contiguously from 1 (expected {expected}, got {})",
                    split.index
                )));
            }
            if !split.distance_meters.is_finite() || split.distance_meters <= 0.0 {
                return Err(AppError::invalid_input(format!(
                    "split {expected} distance must be > 0"
                )));
            }
            if split.elapsed_seconds > validation::MAX_DURATION_SECONDS
                || split.moving_seconds > validation::MAX_DURATION_SECONDS
            {
                return Err(AppError::invalid_input(format!(
                    "split {expected} duration must be at most {} seconds",
                    validation::MAX_DURATION_SECONDS
                )));
            }
            validate_heart_rate("split average_heart_rate", split.average_heart_rate)?;
        }
        Ok(())
    }

    /// Build a full activity row from the input
    #[must_use]
    pub fn into_activity(
        self,
        user_id: Uuid,
        source: ActivitySource,
        external_id: Option<String>,
    ) -> Activity {
        let now = Utc::now();
        Activity {
            id: Uuid::new_v4(),
            user_id,
            source,
            external_id,
            name: self.name.trim().to_owned(),
            sport_type: self.sport_type,
            workout_type: self.workout_type,
            start_date: self.start_date,
            distance_meters: self.distance_meters,
            moving_seconds: self.moving_seconds,
            elapsed_seconds: self.elapsed_seconds.unwrap_or(self.moving_seconds),
            elevation_gain: self.elevation_gain,
            average_heart_rate: self.average_heart_rate,
            max_heart_rate: self.max_heart_rate,
            perceived_effort: self.perceived_effort,
            splits: self.splits,
            best_efforts: Vec::new(),
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_heart_rate(field: &str, value: Option<f64>) -> AppResult<()> {
    let Some(bpm) = value else {
        return Ok(());
    };
    let min = f64::from(heart_rate::MIN_VALID_BPM);
    let max = f64::from(heart_rate::MAX_VALID_BPM);
    if bpm.is_finite() && (min..=max).contains(&bpm) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{field} must be between {min} and {max} bpm"
        )))
    }
}
