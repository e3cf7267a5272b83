// ABOUTME: Banister Training Impulse (TRIMP) with sex-specific weighting
// ABOUTME: Basis for heart-rate training stress scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::Sex;
use serde::{Deserialize, Serialize};

/// TRIMP weighting selection
///
/// - `BanisterMale`: `exp(1.92 x HRr)`
/// - `BanisterFemale`: `exp(1.67 x HRr)`
///
/// # Scientific References
///
/// - Banister, E.W. (1991). "Modeling elite athletic performance." *Physiological Testing of Elite Athletes*.
/// - Morton, R.H. et al. (1990). "Modeling human performance in running." *J Appl Physiol*, 69(3), 1171-1177.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrimpAlgorithm {
    /// Male weighting (also used when sex is unknown)
    #[default]
    BanisterMale,
    /// Female weighting
    BanisterFemale,
}

const BASE_MULTIPLIER: f64 = 0.64;
const MALE_FACTOR: f64 = 1.92;
const FEMALE_FACTOR: f64 = 1.67;

impl TrimpAlgorithm {
    /// Pick the weighting for an athlete's sex
    #[must_use]
    pub const fn for_sex(sex: Option<Sex>) -> Self {
        match sex {
            Some(Sex::Female) => Self::BanisterFemale,
            Some(Sex::Male) | None => Self::BanisterMale,
        }
    }

    /// Exponential weighting factor
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::BanisterMale => MALE_FACTOR,
            Self::BanisterFemale => FEMALE_FACTOR,
        }
    }

    /// Calculate TRIMP
    ///
    /// `minutes x HRr x 0.64 x exp(k x HRr)` with
    /// `HRr = (avg - rest) / (max - rest)` clamped to 0-1.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when duration is not positive or the
    /// heart rate reserve is not positive.
    pub fn calculate(
        self,
        avg_hr: f64,
        duration_minutes: f64,
        max_hr: f64,
        resting_hr: f64,
    ) -> AppResult<f64> {
        if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
            return Err(AppError::invalid_input("Duration must be greater than zero"));
        }
        let reserve = max_hr - resting_hr;
        if !reserve.is_finite() || reserve <= 0.0 {
            return Err(AppError::invalid_input(format!(
                "Max HR ({max_hr}) must exceed resting HR ({resting_hr})"
            )));
        }
        let ratio = ((avg_hr - resting_hr) / reserve).clamp(0.0, 1.0);
        Ok(duration_minutes * ratio * BASE_MULTIPLIER * (self.factor() * ratio).exp())
    }

    /// Get algorithm name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BanisterMale => "banister_male",
            Self::BanisterFemale => "banister_female",
        }
    }

    /// Get the formula as a string
    #[must_use]
    pub const fn formula(self) -> &'static str {
        match self {
            Self::BanisterMale => "minutes x HRr x 0.64 x exp(1.92 x HRr)",
            Self::BanisterFemale => "minutes x HRr x 0.64 x exp(1.67 x HRr)",
        }
    }
}

impl FromStr for TrimpAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "banister_male" | "male" => Ok(Self::BanisterMale),
            "banister_female" | "female" => Ok(Self::BanisterFemale),
            other => Err(AppError::invalid_input(format!(
                "Unknown TRIMP algorithm: '{other}'. Valid options: banister_male, banister_female"
            ))),
        }
    }
}
