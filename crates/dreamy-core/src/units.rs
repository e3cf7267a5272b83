// ABOUTME: Unit conversions for distance, pace and duration
// ABOUTME: Also defines the standard race distances used for records and predictions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Meters in one kilometer
pub const METERS_PER_KM: f64 = 1000.0;
/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.344;
/// Half marathon distance in meters
pub const HALF_MARATHON_METERS: f64 = 21_097.5;
/// Marathon distance in meters
pub const MARATHON_METERS: f64 = 42_195.0;

/// Convert a speed in m/s to a pace in seconds per kilometer
///
/// Returns `None` for non-positive or non-finite speeds.
#[must_use]
pub fn speed_to_pace_per_km(speed_mps: f64) -> Option<f64> {
    (speed_mps.is_finite() && speed_mps > 0.0).then(|| METERS_PER_KM / speed_mps)
}

/// Convert a pace in seconds per kilometer to a speed in m/s
#[must_use]
pub fn pace_per_km_to_speed(pace_seconds: f64) -> Option<f64> {
    (pace_seconds.is_finite() && pace_seconds > 0.0).then(|| METERS_PER_KM / pace_seconds)
}

/// Convert a pace per kilometer to a pace per mile
#[must_use]
pub fn pace_km_to_mile(pace_seconds_per_km: f64) -> f64 {
    pace_seconds_per_km * METERS_PER_MILE / METERS_PER_KM
}

/// Format seconds as `H:MM:SS`, or `M:SS` under an hour
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Format a pace in seconds per kilometer as `M:SS/km`
#[must_use]
pub fn format_pace(pace_seconds_per_km: f64) -> String {
    format!("{}/km", format_duration(pace_seconds_per_km))
}

/// Parse `H:MM:SS`, `MM:SS` or plain seconds into seconds
///
/// # Errors
///
/// Returns an invalid-input error when a component is not a number, when
/// minutes or seconds exceed 59 in a compound form, or when there are more
/// than three components.
pub fn parse_duration(input: &str) -> AppResult<u32> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let numbers = parts
        .iter()
        .map(|p| {
            p.trim()
                .parse::<u32>()
                .map_err(|_| AppError::invalid_input(format!("Invalid duration: {input}")))
        })
        .collect::<AppResult<Vec<u32>>>()?;

    let in_range = |v: u32| v < 60;
    match numbers.as_slice() {
        [s] => Ok(*s),
        [m, s] if in_range(*s) => Ok(m * 60 + s),
        [h, m, s] if in_range(*m) && in_range(*s) => Ok(h * 3600 + m * 60 + s),
        _ => Err(AppError::invalid_input(format!("Invalid duration: {input}"))),
    }
}

/// A standard race distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StandardDistance {
    /// 400 meters
    M400,
    /// Half mile
    HalfMile,
    /// 1 kilometer
    K1,
    /// 1 mile
    Mile,
    /// 2 miles
    TwoMile,
    /// 5 kilometers
    K5,
    /// 10 kilometers
    K10,
    /// 15 kilometers
    K15,
    /// 10 miles
    TenMile,
    /// 20 kilometers
    K20,
    /// Half marathon
    HalfMarathon,
    /// 30 kilometers
    K30,
    /// Marathon
    Marathon,
    /// 50 kilometers
    K50,
}

impl StandardDistance {
    /// All standard distances, shortest first
    pub const ALL: [Self; 14] = [
        Self::M400,
        Self::HalfMile,
        Self::K1,
        Self::Mile,
        Self::TwoMile,
        Self::K5,
        Self::K10,
        Self::K15,
        Self::TenMile,
        Self::K20,
        Self::HalfMarathon,
        Self::K30,
        Self::Marathon,
        Self::K50,
    ];

    /// Length in meters
    #[must_use]
    pub const fn meters(self) -> f64 {
        match self {
            Self::M400 => 400.0,
            Self::HalfMile => 804.672,
            Self::K1 => 1000.0,
            Self::Mile => METERS_PER_MILE,
            Self::TwoMile => 3_218.688,
            Self::K5 => 5000.0,
            Self::K10 => 10_000.0,
            Self::K15 => 15_000.0,
            Self::TenMile => 16_093.44,
            Self::K20 => 20_000.0,
            Self::HalfMarathon => HALF_MARATHON_METERS,
            Self::K30 => 30_000.0,
            Self::Marathon => MARATHON_METERS,
            Self::K50 => 50_000.0,
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::M400 => "400m",
            Self::HalfMile => "1/2 mile",
            Self::K1 => "1K",
            Self::Mile => "1 mile",
            Self::TwoMile => "2 mile",
            Self::K5 => "5K",
            Self::K10 => "10K",
            Self::K15 => "15K",
            Self::TenMile => "10 mile",
            Self::K20 => "20K",
            Self::HalfMarathon => "Half-Marathon",
            Self::K30 => "30K",
            Self::Marathon => "Marathon",
            Self::K50 => "50K",
        }
    }

    /// Map a Strava best-effort name ("5k", "Half-Marathon", ...) to a distance
    #[must_use]
    pub fn from_strava_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let distance = match normalized.as_str() {
            "400m" => Self::M400,
            "1/2 mile" => Self::HalfMile,
            "1k" => Self::K1,
            "1 mile" => Self::Mile,
            "2 mile" => Self::TwoMile,
            "5k" => Self::K5,
            "10k" => Self::K10,
            "15k" => Self::K15,
            "10 mile" => Self::TenMile,
            "20k" => Self::K20,
            "half-marathon" | "half marathon" => Self::HalfMarathon,
            "30k" => Self::K30,
            "marathon" => Self::Marathon,
            "50k" => Self::K50,
            _ => return None,
        };
        Some(distance)
    }

    /// Closest standard distance within a relative tolerance on both sides
    #[must_use]
    pub fn within_tolerance(distance_meters: f64, tolerance: f64) -> Option<Self> {
        Self::matching(distance_meters, 1.0 - tolerance, 1.0 + tolerance)
    }

    /// Standard distance `d` with `d * low <= distance <= d * high`
    ///
    /// When several qualify, the longest wins so a run is credited with the
    /// most demanding distance it covered.
    #[must_use]
    pub fn matching(distance_meters: f64, low: f64, high: f64) -> Option<Self> {
        if !distance_meters.is_finite() || distance_meters <= 0.0 {
            return None;
        }
        Self::ALL.iter().rev().copied().find(|d| {
            let m = d.meters();
            distance_meters >= m * low && distance_meters <= m * high
        })
    }
}

impl fmt::Display for StandardDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
