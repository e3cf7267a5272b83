// ABOUTME: Athlete profile with the physiological settings analytics depend on
// ABOUTME: Profiles are created lazily and updated field by field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::heart_rate;
use crate::errors::{AppError, AppResult};

/// Biological sex, used for the TRIMP weighting coefficient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

impl Sex {
    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(AppError::invalid_input(format!("Unknown sex: {other}"))),
        }
    }
}

/// Athlete settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Owner
    pub user_id: Uuid,
    /// Name shown in the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Biological sex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    /// Year of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    /// Maximum heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<f64>,
    /// Resting heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<f64>,
    /// Lactate-threshold heart rate in BPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_heart_rate: Option<f64>,
    /// Threshold pace in seconds per kilometer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_pace_seconds_per_km: Option<f64>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl AthleteProfile {
    /// Empty profile for a user seen for the first time
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            display_name: None,
            sex: None,
            birth_year: None,
            max_heart_rate: None,
            resting_heart_rate: None,
            threshold_heart_rate: None,
            threshold_pace_seconds_per_km: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply a partial update, keeping fields the update leaves out
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when a value is out of range.
    pub fn apply(&mut self, update: ProfileUpdate) -> AppResult<()> {
        update.validate()?;
        if update.display_name.is_some() {
            self.display_name = update.display_name;
        }
        if update.sex.is_some() {
            self.sex = update.sex;
        }
        if update.birth_year.is_some() {
            self.birth_year = update.birth_year;
        }
        if update.max_heart_rate.is_some() {
            self.max_heart_rate = update.max_heart_rate;
        }
        if update.resting_heart_rate.is_some() {
            self.resting_heart_rate = update.resting_heart_rate;
        }
        if update.threshold_heart_rate.is_some() {
            self.threshold_heart_rate = update.threshold_heart_rate;
        }
        if update.threshold_pace_seconds_per_km.is_some() {
            self.threshold_pace_seconds_per_km = update.threshold_pace_seconds_per_km;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Name shown in the UI
    #[serde(default)]
    pub display_name: Option<String>,
    /// Biological sex
    #[serde(default)]
    pub sex: Option<Sex>,
    /// Year of birth
    #[serde(default)]
    pub birth_year: Option<i32>,
    /// Maximum heart rate
    #[serde(default)]
    pub max_heart_rate: Option<f64>,
    /// Resting heart rate
    #[serde(default)]
    pub resting_heart_rate: Option<f64>,
    /// Lactate-threshold heart rate
    #[serde(default)]
    pub threshold_heart_rate: Option<f64>,
    /// Threshold pace in seconds per kilometer
    #[serde(default)]
    pub threshold_pace_seconds_per_km: Option<f64>,
}

impl ProfileUpdate {
    fn validate(&self) -> AppResult<()> {
        let min = f64::from(heart_rate::MIN_VALID_BPM);
        let max = f64::from(heart_rate::MAX_VALID_BPM);
        for (field, value) in [
            ("max_heart_rate", self.max_heart_rate),
            ("resting_heart_rate", self.resting_heart_rate),
            ("threshold_heart_rate", self.threshold_heart_rate),
        ] {
            if let Some(bpm) = value {
                if !bpm.is_finite() || !(min..=max).contains(&bpm) {
                    return Err(AppError::invalid_input(format!(
                        "{field} must be between {min} and {max} bpm"
                    )));
                }
            }
        }
        if let (Some(rest), Some(top)) = (self.resting_heart_rate, self.max_heart_rate) {
            if rest >= top {
                return Err(AppError::invalid_input(
                    "resting_heart_rate must be below max_heart_rate",
                ));
            }
        }
        if let Some(pace) = self.threshold_pace_seconds_per_km {
            if !pace.is_finite() || !(120.0..=900.0).contains(&pace) {
                return Err(AppError::invalid_input(
                    "threshold_pace_seconds_per_km must be between 120 and 900",
                ));
            }
        }
        if let Some(year) = self.birth_year {
            if !(1900..=2100).contains(&year) {
                return Err(AppError::invalid_input("birth_year is out of range"));
            }
        }
        Ok(())
    }
}
