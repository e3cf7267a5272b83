// ABOUTME: Sport, workout and activity source enumerations
// ABOUTME: Includes Strava type-string mapping and stable storage names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Kind of activity
///
/// Only the first three variants count as running for analytics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Road or track running
    #[default]
    Run,
    /// Trail running
    TrailRun,
    /// Treadmill or virtual running
    Treadmill,
    /// Walking
    Walk,
    /// Hiking
    Hike,
    /// Cycling of any kind
    Ride,
    /// Swimming
    Swim,
    /// Gym or generic workout
    Workout,
    /// Anything else
    Other,
}

impl SportType {
    /// Whether the sport counts as running
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Run | Self::TrailRun | Self::Treadmill)
    }

    /// Map a Strava `sport_type`/`type` string
    #[must_use]
    pub fn from_strava(value: &str) -> Self {
        match value {
            "Run" => Self::Run,
            "TrailRun" => Self::TrailRun,
            "VirtualRun" => Self::Treadmill,
            "Walk" => Self::Walk,
            "Hike" => Self::Hike,
            "Ride" | "VirtualRide" | "GravelRide" | "MountainBikeRide" | "EBikeRide"
            | "EMountainBikeRide" => Self::Ride,
            "Swim" => Self::Swim,
            "Workout" | "WeightTraining" | "Crossfit" | "Yoga" | "Pilates"
            | "HighIntensityIntervalTraining" => Self::Workout,
            _ => Self::Other,
        }
    }

    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::TrailRun => "trail_run",
            Self::Treadmill => "treadmill",
            Self::Walk => "walk",
            Self::Hike => "hike",
            Self::Ride => "ride",
            Self::Swim => "swim",
            Self::Workout => "workout",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Self::Run),
            "trail_run" => Ok(Self::TrailRun),
            "treadmill" => Ok(Self::Treadmill),
            "walk" => Ok(Self::Walk),
            "hike" => Ok(Self::Hike),
            "ride" => Ok(Self::Ride),
            "swim" => Ok(Self::Swim),
            "workout" => Ok(Self::Workout),
            "other" => Ok(Self::Other),
            other => Err(AppError::invalid_input(format!("Unknown sport type: {other}"))),
        }
    }
}

/// Purpose of a workout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    /// Easy aerobic running
    #[default]
    Easy,
    /// Long run
    Long,
    /// Tempo or threshold session
    Tempo,
    /// Interval session
    Interval,
    /// Race effort
    Race,
    /// Recovery run
    Recovery,
    /// Unclassified
    Other,
}

impl WorkoutType {
    /// Map Strava's numeric `workout_type` (run values 0-3)
    #[must_use]
    pub const fn from_strava(value: Option<i64>) -> Self {
        match value {
            Some(1) => Self::Race,
            Some(2) => Self::Long,
            Some(3) => Self::Tempo,
            Some(0) | None => Self::Easy,
            Some(_) => Self::Other,
        }
    }

    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Long => "long",
            Self::Tempo => "tempo",
            Self::Interval => "interval",
            Self::Race => "race",
            Self::Recovery => "recovery",
            Self::Other => "other",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "long" => Ok(Self::Long),
            "tempo" => Ok(Self::Tempo),
            "interval" => Ok(Self::Interval),
            "race" => Ok(Self::Race),
            "recovery" => Ok(Self::Recovery),
            "other" => Ok(Self::Other),
            other => Err(AppError::invalid_input(format!("Unknown workout type: {other}"))),
        }
    }
}

/// Where an activity came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    /// Entered by the athlete
    Manual,
    /// Imported from Strava
    Strava,
}

impl ActivitySource {
    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Strava => "strava",
        }
    }
}

impl FromStr for ActivitySource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "strava" => Ok(Self::Strava),
            other => Err(AppError::invalid_input(format!(
                "Unknown activity source: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strava_sport_mapping() {
        assert_eq!(SportType::from_strava("VirtualRun"), SportType::Treadmill);
        assert_eq!(SportType::from_strava("GravelRide"), SportType::Ride);
        assert_eq!(SportType::from_strava("Kitesurf"), SportType::Other);
        assert!(SportType::from_strava("TrailRun").is_running());
        assert!(!SportType::Walk.is_running());
    }

    #[test]
    fn test_storage_names_round_trip() {
        for sport in [SportType::Run, SportType::TrailRun, SportType::Other] {
            assert_eq!(sport.as_str().parse::<SportType>().unwrap(), sport);
        }
        assert_eq!(WorkoutType::from_strava(Some(1)), WorkoutType::Race);
        assert_eq!(WorkoutType::from_strava(None), WorkoutType::Easy);
    }
}
