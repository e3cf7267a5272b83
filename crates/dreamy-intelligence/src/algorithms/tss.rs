// ABOUTME: Training stress score formulas for running: hrTSS, rTSS, session RPE and duration
// ABOUTME: StressMethod names the formula; the calculator decides which one applies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use dreamy_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::TrimpAlgorithm;

/// Training stress formula
///
/// Scores are normalized so one hour at threshold is about 100.
///
/// # Scientific References
///
/// - Coggan, A. (2003). "Training and Racing Using a Power Meter." *Peaksware LLC*.
/// - Foster, C. et al. (2001). "A new approach to monitoring exercise training." *J Strength Cond Res*, 15(1), 109-115.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StressMethod {
    /// Running TSS from pace relative to threshold pace
    ///
    /// Formula: `hours x IF² x 100`, `IF = speed / threshold speed`
    Pace,
    /// Heart-rate TSS from Banister TRIMP relative to an hour at LTHR
    HeartRate,
    /// Session RPE: `minutes x RPE / 6`
    PerceivedEffort,
    /// Duration only: 60 per hour
    Duration,
}

/// Lowest intensity factor credited
pub const MIN_INTENSITY_FACTOR: f64 = 0.3;
/// Highest intensity factor credited
pub const MAX_INTENSITY_FACTOR: f64 = 1.5;
/// Score per hour when only duration is known (IF about 0.77)
pub const DURATION_TSS_PER_HOUR: f64 = 60.0;
/// RPE that maps one hour to the duration fallback score
const RPE_REFERENCE: f64 = 6.0;

impl StressMethod {
    /// Running TSS
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when hours, speed or threshold speed is
    /// not positive.
    /// Returns the score together with the intensity factor.
    pub fn running_tss(
        hours: f64,
        speed_mps: f64,
        threshold_speed_mps: f64,
    ) -> AppResult<(f64, f64)> {
        if hours <= 0.0 || speed_mps <= 0.0 || threshold_speed_mps <= 0.0 {
            return Err(AppError::invalid_input(
                "rTSS requires positive duration, speed and threshold speed",
            ));
        }
        let intensity =
            (speed_mps / threshold_speed_mps).clamp(MIN_INTENSITY_FACTOR, MAX_INTENSITY_FACTOR);
        Ok((hours * intensity * intensity * 100.0, intensity))
    }

    /// Heart-rate TSS
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when the TRIMP inputs are invalid.
    pub fn heart_rate_tss(
        trimp: TrimpAlgorithm,
        avg_hr: f64,
        minutes: f64,
        max_hr: f64,
        resting_hr: f64,
        lthr: f64,
    ) -> AppResult<f64> {
        let session = trimp.calculate(avg_hr, minutes, max_hr, resting_hr)?;
        let hour_at_threshold = trimp.calculate(lthr, 60.0, max_hr, resting_hr)?;
        if hour_at_threshold <= 0.0 {
            return Err(AppError::invalid_input("LTHR must exceed resting HR"));
        }
        Ok(session / hour_at_threshold * 100.0)
    }

    /// Session RPE score
    #[must_use]
    pub fn perceived_effort_tss(minutes: f64, rpe: u8) -> f64 {
        minutes.max(0.0) * f64::from(rpe) / RPE_REFERENCE
    }

    /// Duration-only score
    #[must_use]
    pub fn duration_tss(hours: f64) -> f64 {
        hours.max(0.0) * DURATION_TSS_PER_HOUR
    }

    /// Get method name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pace => "pace",
            Self::HeartRate => "heart_rate",
            Self::PerceivedEffort => "perceived_effort",
            Self::Duration => "duration",
        }
    }

    /// Get the formula as a string
    #[must_use]
    pub const fn formula(self) -> &'static str {
        match self {
            Self::Pace => "rTSS = hours x IF² x 100",
            Self::HeartRate => "hrTSS = TRIMP / TRIMP(60 min at LTHR) x 100",
            Self::PerceivedEffort => "sRPE = minutes x RPE / 6",
            Self::Duration => "TSS = hours x 60",
        }
    }
}

impl FromStr for StressMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pace" => Ok(Self::Pace),
            "heart_rate" => Ok(Self::HeartRate),
            "perceived_effort" => Ok(Self::PerceivedEffort),
            "duration" => Ok(Self::Duration),
            other => Err(AppError::invalid_input(format!(
                "Unknown stress method: '{other}'. Valid options: pace, heart_rate, perceived_effort, duration"
            ))),
        }
    }
}
