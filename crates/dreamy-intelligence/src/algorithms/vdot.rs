// ABOUTME: VDOT calculation with the Daniels-Gilbert equations and a Riegel variant
// ABOUTME: Includes race-time prediction by bisection and Daniels training paces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use dreamy_core::constants::fitness;
use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::units::{StandardDistance, MARATHON_METERS, METERS_PER_KM};
use serde::{Deserialize, Serialize};

/// VDOT calculation algorithm selection
///
/// - `Daniels`: Daniels-Gilbert oxygen cost and drop-dead curves
/// - `Riegel`: scale the performance to a 10 km equivalent, then apply Daniels
///
/// # Scientific References
///
/// - Daniels, J. & Gilbert, J. (1979). "Oxygen Power: Performance Tables for Distance Runners."
/// - Riegel, P.S. (1981). "Athletic records and human endurance." *American Scientist*, 69(3), 285-290.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VdotAlgorithm {
    /// Daniels-Gilbert formula
    ///
    /// `VO2 = -4.60 + 0.182258 v + 0.000104 v²` (v in m/min)
    ///
    /// `%max = 0.8 + 0.1894393 e^(-0.012778 t) + 0.2989558 e^(-0.1932605 t)` (t in minutes)
    #[default]
    Daniels,

    /// Riegel power-law normalization to 10 km before applying Daniels
    Riegel {
        /// Fatigue exponent (1.06 typical, 1.03-1.08 by athlete)
        exponent: f64,
    },
}

const VO2_A: f64 = 0.000_104;
const VO2_B: f64 = 0.182_258;
const VO2_C: f64 = -4.60;

const PCT_BASE: f64 = 0.8;
const PCT_SLOW_COEF: f64 = 0.189_439_3;
const PCT_SLOW_RATE: f64 = -0.012_778;
const PCT_FAST_COEF: f64 = 0.298_955_8;
const PCT_FAST_RATE: f64 = -0.193_260_5;

const REFERENCE_DISTANCE: f64 = 10_000.0;

/// Oxygen cost of running at `velocity` meters per minute
#[must_use]
pub fn oxygen_cost(velocity: f64) -> f64 {
    (VO2_A * velocity).mul_add(velocity, VO2_B.mul_add(velocity, VO2_C))
}

/// Fraction of VO2max sustainable for `minutes`
#[must_use]
pub fn fraction_of_max(minutes: f64) -> f64 {
    PCT_FAST_COEF.mul_add(
        (PCT_FAST_RATE * minutes).exp(),
        PCT_SLOW_COEF.mul_add((PCT_SLOW_RATE * minutes).exp(), PCT_BASE),
    )
}

/// Velocity (m/min) whose oxygen cost equals `vo2`
///
/// Positive root of the oxygen cost quadratic.
#[must_use]
pub fn velocity_for_vo2(vo2: f64) -> f64 {
    let c = VO2_C - vo2;
    let discriminant = VO2_B.mul_add(VO2_B, -(4.0 * VO2_A * c));
    (-VO2_B + discriminant.max(0.0).sqrt()) / (2.0 * VO2_A)
}

fn daniels_unchecked(distance_meters: f64, time_seconds: f64) -> f64 {
    let minutes = time_seconds / 60.0;
    oxygen_cost(distance_meters / minutes) / fraction_of_max(minutes)
}

impl VdotAlgorithm {
    /// Calculate VDOT from a performance
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when distance or time is not positive
    /// and finite, or when the velocity falls outside 100-500 m/min.
    pub fn calculate_vdot(&self, distance_meters: f64, time_seconds: f64) -> AppResult<f64> {
        if !time_seconds.is_finite() || time_seconds <= 0.0 {
            return Err(AppError::invalid_input("Time must be positive"));
        }
        if !distance_meters.is_finite() || distance_meters <= 0.0 {
            return Err(AppError::invalid_input("Distance must be positive"));
        }

        let (distance, time) = match self {
            Self::Daniels => (distance_meters, time_seconds),
            Self::Riegel { exponent } => (
                REFERENCE_DISTANCE,
                time_seconds * (REFERENCE_DISTANCE / distance_meters).powf(*exponent),
            ),
        };

        let velocity = distance / (time / 60.0);
        if !(fitness::MIN_VELOCITY_M_PER_MIN..=fitness::MAX_VELOCITY_M_PER_MIN).contains(&velocity)
        {
            return Err(AppError::invalid_input(format!(
                "Velocity {velocity:.1} m/min is outside valid range ({}-{})",
                fitness::MIN_VELOCITY_M_PER_MIN,
                fitness::MAX_VELOCITY_M_PER_MIN
            )));
        }

        Ok(daniels_unchecked(distance, time))
    }

    /// Predict a race time in seconds for `target_distance_meters`
    ///
    /// Daniels inverts the formula by bisection on time. Riegel predicts the
    /// 10 km time with Daniels and scales it with the power law.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when VDOT lies outside 15-90 or the
    /// distance is not positive.
    pub fn predict_time(&self, vdot: f64, target_distance_meters: f64) -> AppResult<f64> {
        if !vdot.is_finite() || !(fitness::MIN_VDOT..=fitness::MAX_VDOT).contains(&vdot) {
            return Err(AppError::invalid_input(format!(
                "VDOT {vdot:.1} is outside supported range ({}-{})",
                fitness::MIN_VDOT,
                fitness::MAX_VDOT
            )));
        }
        if !target_distance_meters.is_finite() || target_distance_meters <= 0.0 {
            return Err(AppError::invalid_input("Distance must be positive"));
        }

        match self {
            Self::Daniels => Ok(solve_daniels_time(vdot, target_distance_meters)),
            Self::Riegel { exponent } => {
                let reference = solve_daniels_time(vdot, REFERENCE_DISTANCE);
                Ok(reference * (target_distance_meters / REFERENCE_DISTANCE).powf(*exponent))
            }
        }
    }

    /// Get algorithm name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Daniels => "daniels",
            Self::Riegel { .. } => "riegel",
        }
    }

    /// Get algorithm description
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Daniels => "Daniels-Gilbert VDOT (oxygen cost over sustainable fraction)".to_owned(),
            Self::Riegel { exponent } => {
                format!("Riegel 10 km equivalent (T2 = T1 x (D2/D1)^{exponent:.2}) then Daniels")
            }
        }
    }

    /// Get the formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        match self {
            Self::Daniels => "VDOT = (-4.60 + 0.182258v + 0.000104v²) / (0.8 + 0.1894393e^(-0.012778t) + 0.2989558e^(-0.1932605t))",
            Self::Riegel { .. } => "T10k = T1 x (10000/D1)^exponent; VDOT = Daniels(10000, T10k)",
        }
    }
}

impl FromStr for VdotAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daniels" => Ok(Self::Daniels),
            "riegel" => Ok(Self::Riegel {
                exponent: fitness::RIEGEL_EXPONENT,
            }),
            other => Err(AppError::invalid_input(format!(
                "Unknown VDOT algorithm: '{other}'. Valid options: daniels, riegel"
            ))),
        }
    }
}

/// Bisection on time: VDOT(d, t) decreases monotonically as t grows.
fn solve_daniels_time(vdot: f64, distance_meters: f64) -> f64 {
    // 40-600 m/min brackets every VDOT in the supported range
    let mut fast = distance_meters / 600.0 * 60.0;
    let mut slow = distance_meters / 40.0 * 60.0;
    for _ in 0..100 {
        let mid = (fast + slow) / 2.0;
        if daniels_unchecked(distance_meters, mid) > vdot {
            fast = mid;
        } else {
            slow = mid;
        }
        if slow - fast < 1e-3 {
            break;
        }
    }
    (fast + slow) / 2.0
}

/// Pace band in seconds per kilometer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceRange {
    /// Faster end of the band
    pub fast: f64,
    /// Slower end of the band
    pub slow: f64,
}

/// Daniels training paces for a VDOT
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingPaces {
    /// Easy and long runs (59-74 % of VO2max)
    pub easy: PaceRange,
    /// Predicted marathon race pace
    pub marathon: PaceRange,
    /// Threshold (83-88 %)
    pub threshold: PaceRange,
    /// Interval (95-100 %)
    pub interval: PaceRange,
    /// Repetition (105-110 %)
    pub repetition: PaceRange,
}

fn pace_at_fraction(vdot: f64, fraction: f64) -> f64 {
    METERS_PER_KM * 60.0 / velocity_for_vo2(vdot * fraction)
}

fn band(vdot: f64, low: f64, high: f64) -> PaceRange {
    PaceRange {
        fast: pace_at_fraction(vdot, high),
        slow: pace_at_fraction(vdot, low),
    }
}

/// Training paces for a VDOT
///
/// # Errors
///
/// Returns `AppError::InvalidInput` when VDOT lies outside 15-90.
pub fn training_paces(vdot: f64) -> AppResult<TrainingPaces> {
    let marathon_seconds = VdotAlgorithm::Daniels.predict_time(vdot, MARATHON_METERS)?;
    let marathon_pace = marathon_seconds / (MARATHON_METERS / METERS_PER_KM);
    Ok(TrainingPaces {
        easy: band(vdot, 0.59, 0.74),
        marathon: PaceRange {
            fast: marathon_pace,
            slow: marathon_pace,
        },
        threshold: band(vdot, 0.83, 0.88),
        interval: band(vdot, 0.95, 1.00),
        repetition: band(vdot, 1.05, 1.10),
    })
}

/// Predicted time at a standard distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceEquivalent {
    /// Distance
    pub distance: StandardDistance,
    /// Predicted time in seconds
    pub seconds: f64,
    /// Predicted pace in seconds per kilometer
    pub pace_seconds_per_km: f64,
}

/// Equivalent performances for 1 mile, 5 km, 10 km, half and full marathon
///
/// # Errors
///
/// Returns `AppError::InvalidInput` when VDOT lies outside 15-90.
pub fn race_equivalents(vdot: f64) -> AppResult<Vec<RaceEquivalent>> {
    [
        StandardDistance::Mile,
        StandardDistance::K5,
        StandardDistance::K10,
        StandardDistance::HalfMarathon,
        StandardDistance::Marathon,
    ]
    .into_iter()
    .map(|distance| {
        let seconds = VdotAlgorithm::Daniels.predict_time(vdot, distance.meters())?;
        Ok(RaceEquivalent {
            distance,
            seconds,
            pace_seconds_per_km: seconds / (distance.meters() / METERS_PER_KM),
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daniels_5k_20_minutes() {
        // Published tables put a 20:00 5K at VDOT 49.8
        let vdot = VdotAlgorithm::Daniels.calculate_vdot(5000.0, 1200.0).unwrap();
        assert!((vdot - 49.8).abs() < 0.3, "got {vdot}");
    }

    #[test]
    fn test_prediction_inverts_calculation() {
        let vdot = VdotAlgorithm::Daniels.calculate_vdot(10_000.0, 2_700.0).unwrap();
        let predicted = VdotAlgorithm::Daniels.predict_time(vdot, 10_000.0).unwrap();
        assert!((predicted - 2_700.0).abs() < 1.0, "got {predicted}");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(VdotAlgorithm::Daniels.calculate_vdot(5000.0, 0.0).is_err());
        assert!(VdotAlgorithm::Daniels.calculate_vdot(-1.0, 1200.0).is_err());
        // 5K in 5 minutes is 1000 m/min
        assert!(VdotAlgorithm::Daniels.calculate_vdot(5000.0, 300.0).is_err());
        assert!(VdotAlgorithm::Daniels.predict_time(95.0, 5000.0).is_err());
    }

    #[test]
    fn test_training_paces_are_ordered() {
        let paces = training_paces(50.0).unwrap();
        assert!(paces.easy.slow > paces.easy.fast);
        assert!(paces.easy.fast > paces.marathon.fast);
        assert!(paces.marathon.fast > paces.threshold.slow);
        assert!(paces.threshold.fast > paces.interval.slow);
        assert!(paces.interval.fast > paces.repetition.slow);
    }

    #[test]
    fn test_riegel_close_to_daniels_at_10k() {
        let riegel = VdotAlgorithm::Riegel { exponent: 1.06 };
        let a = riegel.calculate_vdot(10_000.0, 2_400.0).unwrap();
        let b = VdotAlgorithm::Daniels.calculate_vdot(10_000.0, 2_400.0).unwrap();
        assert!((a - b).abs() < 1e-9);
        assert_eq!("riegel".parse::<VdotAlgorithm>().unwrap().name(), "riegel");
    }
}
