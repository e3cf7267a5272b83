// ABOUTME: Lactate threshold detection from per-split heart rate and pace
// ABOUTME: Combines best sustained HR windows with an HR-on-speed regression, plus Friel zones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use dreamy_core::constants::heart_rate;
use dreamy_core::models::{Activity, Split};
use dreamy_core::units::METERS_PER_KM;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::statistics::{linear_regression, Regression};

const MIN_SPLIT_METERS: f64 = 400.0;
const FASTEST_PACE: f64 = 150.0;
const SLOWEST_PACE: f64 = 600.0;
const MAX_ABS_GRADE: f64 = 0.03;
const MIN_REGRESSION_SPLITS: usize = 8;
const LONG_WINDOW_SECONDS: u32 = 30 * 60;
const SHORT_WINDOW_SECONDS: u32 = 20 * 60;

/// How the threshold heart rate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Best sustained window of at least 30 minutes
    ThirtyMinuteWindow,
    /// Best window of at least 20 minutes, scaled by 0.98
    TwentyMinuteWindow,
    /// 89 % of the highest observed heart rate
    MaxHeartRate,
}

/// How the threshold pace was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceMethod {
    /// Regression line evaluated at LTHR
    Regression,
    /// Average pace of the LTHR window
    Window,
}

/// Confidence in an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// r² at least 0.7 over at least 30 splits
    High,
    /// r² at least 0.4
    Medium,
    /// Anything weaker
    Low,
}

impl Confidence {
    fn from_fit(fit: Option<&Regression>) -> Self {
        match fit {
            Some(fit) if fit.r_squared >= 0.7 && fit.n >= 30 => Self::High,
            Some(fit) if fit.r_squared >= 0.4 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Estimated threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEstimate {
    /// Lactate-threshold heart rate in BPM
    pub lthr: f64,
    /// Threshold pace in seconds per kilometer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_pace_seconds_per_km: Option<f64>,
    /// How LTHR was found
    pub method: ThresholdMethod,
    /// How the pace was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_method: Option<PaceMethod>,
    /// Confidence in the estimate
    pub confidence: Confidence,
    /// Qualifying splits considered
    pub splits_used: usize,
    /// Fit quality of the HR-on-speed regression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

/// Sustained window found inside one activity
#[derive(Debug, Clone, Copy)]
struct Window {
    average_hr: f64,
    distance_meters: f64,
    seconds: u64,
}

impl Window {
    fn pace(self) -> Option<f64> {
        (self.distance_meters > 0.0)
            .then(|| self.seconds as f64 / self.distance_meters * METERS_PER_KM)
    }
}

/// Detects threshold heart rate and pace from running splits
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdDetector;

impl ThresholdDetector {
    /// Whether a split is steady, flat and physiologically plausible
    #[must_use]
    pub fn split_qualifies(split: &Split) -> bool {
        let Some(hr) = split.average_heart_rate else {
            return false;
        };
        let Some(pace) = split.pace_seconds_per_km() else {
            return false;
        };
        split.distance_meters >= MIN_SPLIT_METERS
            && (heart_rate::SPLIT_MIN_BPM..=heart_rate::SPLIT_MAX_BPM).contains(&hr)
            && (FASTEST_PACE..=SLOWEST_PACE).contains(&pace)
            && split.grade().abs() <= MAX_ABS_GRADE
    }

    /// Estimate the threshold from running activities
    ///
    /// Returns `None` when no heart-rate data exists at all.
    #[must_use]
    pub fn detect(activities: &[Activity]) -> Option<ThresholdEstimate> {
        let runs: Vec<&Activity> = activities.iter().filter(|a| a.is_run()).collect();

        let points: Vec<(f64, f64)> = runs
            .iter()
            .flat_map(|a| a.splits.iter())
            .filter(|s| Self::split_qualifies(s))
            .filter_map(|s| Some((s.speed()?, s.average_heart_rate?)))
            .collect();
        let splits_used = points.len();

        let fit = if splits_used >= MIN_REGRESSION_SPLITS {
            linear_regression(&points).filter(|fit| fit.slope > 0.0)
        } else {
            None
        };

        let best = |min_seconds| {
            runs.iter()
                .filter_map(|a| Self::best_window(&a.splits, min_seconds))
                .max_by(|a, b| a.average_hr.total_cmp(&b.average_hr))
        };

        let (lthr, method, window) = if let Some(w) = best(LONG_WINDOW_SECONDS) {
            (w.average_hr, ThresholdMethod::ThirtyMinuteWindow, Some(w))
        } else if let Some(w) = best(SHORT_WINDOW_SECONDS) {
            (
                w.average_hr * heart_rate::TWENTY_MINUTE_CORRECTION,
                ThresholdMethod::TwentyMinuteWindow,
                Some(w),
            )
        } else {
            let max = observed_max_heart_rate(activities)?;
            (
                max * heart_rate::LTHR_FROM_MAX_FRACTION,
                ThresholdMethod::MaxHeartRate,
                None,
            )
        };

        let regression_pace = fit
            .as_ref()
            .and_then(|fit| fit.solve_for_x(lthr))
            .filter(|speed| *speed > 0.0)
            .map(|speed| METERS_PER_KM / speed)
            .filter(|pace| (FASTEST_PACE..=SLOWEST_PACE).contains(pace));

        let (threshold_pace_seconds_per_km, pace_method) = match regression_pace {
            Some(pace) => (Some(pace), Some(PaceMethod::Regression)),
            None => match window.and_then(|w| w.pace()) {
                Some(pace) => (Some(pace), Some(PaceMethod::Window)),
                None => (None, None),
            },
        };

        debug!(
            lthr,
            ?method,
            splits_used,
            r_squared = fit.map(|f| f.r_squared),
            "Threshold estimated"
        );

        Some(ThresholdEstimate {
            lthr,
            threshold_pace_seconds_per_km,
            method,
            pace_method,
            confidence: Confidence::from_fit(fit.as_ref()),
            splits_used,
            r_squared: fit.map(|f| f.r_squared),
        })
    }

    /// Highest time-weighted HR over a contiguous run of qualifying splits
    /// lasting at least `min_seconds`
    fn best_window(splits: &[Split], min_seconds: u32) -> Option<Window> {
        let mut ordered: Vec<&Split> = splits.iter().collect();
        ordered.sort_by_key(|s| s.index);

        let mut best: Option<Window> = None;
        let mut tail = ordered.as_slice();
        while let Some((_, rest)) = tail.split_first() {
            let mut seconds = 0_u64;
            let mut weighted_hr = 0.0;
            let mut distance = 0.0;
            for split in tail {
                if !Self::split_qualifies(split) {
                    break;
                }
                let split_seconds = split.effective_seconds();
                seconds += u64::from(split_seconds);
                weighted_hr += split.average_heart_rate.unwrap_or(0.0) * f64::from(split_seconds);
                distance += split.distance_meters;
                if seconds >= u64::from(min_seconds) {
                    let candidate = Window {
                        average_hr: weighted_hr / seconds as f64,
                        distance_meters: distance,
                        seconds,
                    };
                    match best {
                        Some(b) if b.average_hr >= candidate.average_hr => {}
                        _ => best = Some(candidate),
                    }
                    break;
                }
            }
            tail = rest;
        }
        best
    }
}

/// Highest heart rate seen in activities or their splits
#[must_use]
pub fn observed_max_heart_rate(activities: &[Activity]) -> Option<f64> {
    activities
        .iter()
        .flat_map(|a| {
            a.max_heart_rate
                .into_iter()
                .chain(a.average_heart_rate)
                .chain(a.splits.iter().filter_map(|s| s.average_heart_rate))
        })
        .filter(|hr| hr.is_finite() && *hr > 0.0)
        .max_by(f64::total_cmp)
}

/// One heart rate zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZone {
    /// Zone label
    pub name: String,
    /// Lower bound in BPM, inclusive
    pub min_bpm: f64,
    /// Upper bound in BPM, exclusive; open-ended for the top zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bpm: Option<f64>,
}

/// Friel running zones derived from LTHR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZones {
    /// Threshold the zones are based on
    pub lthr: f64,
    /// Zones 1, 2, 3, 4, 5a, 5b, 5c
    pub zones: Vec<HeartRateZone>,
}

impl HeartRateZones {
    /// Build Friel zones: <85 %, 85-89, 90-94, 95-99, 100-102, 103-106, >106 % of LTHR
    #[must_use]
    pub fn from_lthr(lthr: f64) -> Self {
        const BOUNDS: [(&str, f64, Option<f64>); 7] = [
            ("Zone 1 (recovery)", 0.0, Some(0.85)),
            ("Zone 2 (aerobic)", 0.85, Some(0.90)),
            ("Zone 3 (tempo)", 0.90, Some(0.95)),
            ("Zone 4 (sub-threshold)", 0.95, Some(1.00)),
            ("Zone 5a (super-threshold)", 1.00, Some(1.03)),
            ("Zone 5b (aerobic capacity)", 1.03, Some(1.07)),
            ("Zone 5c (anaerobic capacity)", 1.07, None),
        ];
        let zones = BOUNDS
            .iter()
            .map(|(name, low, high)| HeartRateZone {
                name: (*name).to_owned(),
                min_bpm: (lthr * low).round(),
                max_bpm: high.map(|h| (lthr * h).round()),
            })
            .collect();
        Self { lthr, zones }
    }

    /// Index of the zone containing `bpm`
    #[must_use]
    pub fn zone_for(&self, bpm: f64) -> Option<usize> {
        self.zones
            .iter()
            .position(|z| bpm >= z.min_bpm && !matches!(z.max_bpm, Some(max) if bpm >= max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friel_zones() {
        let zones = HeartRateZones::from_lthr(160.0);
        assert_eq!(zones.zones.len(), 7);
        assert_eq!(zones.zones[1].min_bpm, 136.0);
        assert_eq!(zones.zone_for(161.0), Some(4));
        assert_eq!(zones.zone_for(175.0), Some(6));
        assert_eq!(zones.zone_for(100.0), Some(0));
    }

    #[test]
    fn test_split_filter() {
        let split = Split {
            index: 1,
            distance_meters: 1000.0,
            elapsed_seconds: 300,
            moving_seconds: 300,
            average_heart_rate: Some(160.0),
            elevation_difference: Some(10.0),
        };
        assert!(ThresholdDetector::split_qualifies(&split));

        let hilly = Split {
            elevation_difference: Some(50.0),
            ..split.clone()
        };
        assert!(!ThresholdDetector::split_qualifies(&hilly));

        let short = Split {
            distance_meters: 300.0,
            elapsed_seconds: 90,
            moving_seconds: 90,
            ..split
        };
        assert!(!ThresholdDetector::split_qualifies(&short));
    }
}
