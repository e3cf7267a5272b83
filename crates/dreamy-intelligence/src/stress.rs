// ABOUTME: Per-activity training stress with automatic method selection
// ABOUTME: Tries heart rate, then pace, then perceived effort, then duration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{DateTime, Utc};
use dreamy_core::constants::heart_rate;
use dreamy_core::models::{Activity, AthleteProfile};
use dreamy_core::units::pace_per_km_to_speed;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithms::{StressMethod, TrimpAlgorithm};

/// Stress assigned to one activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScore {
    /// Activity the score belongs to
    pub activity_id: Uuid,
    /// Activity start
    pub date: DateTime<Utc>,
    /// Training stress score
    pub tss: f64,
    /// Formula used
    pub method: StressMethod,
    /// Intensity factor when the formula produces one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_factor: Option<f64>,
}

/// Chooses and applies a stress formula for each activity
#[derive(Debug, Clone, Copy, Default)]
pub struct StressCalculator;

impl StressCalculator {
    /// Score an activity against the athlete's settings
    ///
    /// The first applicable method wins, in the order heart rate, pace,
    /// perceived effort, duration. Duration always applies.
    #[must_use]
    pub fn score(activity: &Activity, profile: &AthleteProfile) -> StressScore {
        let (tss, method, intensity_factor) = Self::heart_rate(activity, profile)
            .map(|tss| (tss, StressMethod::HeartRate, None))
            .or_else(|| {
                Self::pace(activity, profile)
                    .map(|(tss, intensity)| (tss, StressMethod::Pace, Some(intensity)))
            })
            .or_else(|| {
                activity.perceived_effort.map(|rpe| {
                    (
                        StressMethod::perceived_effort_tss(activity.hours() * 60.0, rpe),
                        StressMethod::PerceivedEffort,
                        None,
                    )
                })
            })
            .unwrap_or_else(|| {
                (
                    StressMethod::duration_tss(activity.hours()),
                    StressMethod::Duration,
                    None,
                )
            });

        StressScore {
            activity_id: activity.id,
            date: activity.start_date,
            tss,
            method,
            intensity_factor,
        }
    }

    /// Score many activities
    #[must_use]
    pub fn score_all(activities: &[Activity], profile: &AthleteProfile) -> Vec<StressScore> {
        activities
            .iter()
            .map(|activity| Self::score(activity, profile))
            .collect()
    }

    fn heart_rate(activity: &Activity, profile: &AthleteProfile) -> Option<f64> {
        let avg = activity.average_heart_rate?;
        let max = profile.max_heart_rate?;
        let lthr = profile.threshold_heart_rate?;
        let resting = profile
            .resting_heart_rate
            .unwrap_or(heart_rate::DEFAULT_RESTING_BPM);
        if activity.moving_seconds == 0 {
            return None;
        }
        StressMethod::heart_rate_tss(
            TrimpAlgorithm::for_sex(profile.sex),
            avg,
            activity.hours() * 60.0,
            max,
            resting,
            lthr,
        )
        .ok()
    }

    fn pace(activity: &Activity, profile: &AthleteProfile) -> Option<(f64, f64)> {
        if !activity.is_run() {
            return None;
        }
        let threshold_speed = pace_per_km_to_speed(profile.threshold_pace_seconds_per_km?)?;
        let speed = activity.average_speed()?;
        StressMethod::running_tss(activity.hours(), speed, threshold_speed).ok()
    }
}
