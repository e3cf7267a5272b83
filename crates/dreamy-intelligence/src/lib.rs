// ABOUTME: Running analytics engine: fitness, stress, load, thresholds and records
// ABOUTME: Stateless computations over activities that were already fetched from storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![deny(unsafe_code)]

//! # Dreamy Intelligence
//!
//! Every function in this crate is synchronous and side-effect free. Callers
//! load rows from the database and hand slices to the calculators here.
//!
//! - [`algorithms`]: pluggable formulas (VDOT, TRIMP, stress scores, load averaging)
//! - [`fitness`]: current VDOT and its history from races and hard efforts
//! - [`stress`]: per-activity training stress with method selection
//! - [`load`]: CTL/ATL/TSB daily series and summary
//! - [`threshold`]: lactate threshold heart rate and pace from splits
//! - [`records`]: personal records across race, best-effort and activity sources
//! - [`statistics`]: least-squares regression helpers
//! - [`weekly`]: ISO-week training summaries

/// Pluggable algorithm enums
pub mod algorithms;
/// VDOT-based fitness estimation
pub mod fitness;
/// CTL/ATL/TSB series and summaries
pub mod load;
/// Personal record extraction
pub mod records;
/// Regression helpers
pub mod statistics;
/// Training stress per activity
pub mod stress;
/// Threshold detection from splits
pub mod threshold;
/// Weekly summaries
pub mod weekly;

pub use algorithms::{StressMethod, TrainingLoadAlgorithm, TrimpAlgorithm, VdotAlgorithm};
pub use fitness::{
    FitnessEstimate, FitnessEstimator, FitnessHistory, HistoryBucket, Performance, PerformanceSource,
};
pub use load::{DailyLoad, TrainingLoadCalculator, TrainingLoadSummary, TrainingStatus, TssDataPoint};
pub use records::{PersonalRecord, PersonalRecordBook, RecordSource};
pub use statistics::{linear_regression, Regression};
pub use stress::{StressCalculator, StressScore};
pub use threshold::{HeartRateZones, ThresholdDetector, ThresholdEstimate};
pub use weekly::{week_start, weekly_summaries, WeeklySummary};
