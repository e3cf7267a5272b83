// ABOUTME: Current VDOT estimation and monthly VDOT history with a regression trend
// ABOUTME: Performances come from races, Strava best efforts and whole running activities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy
#![allow(clippy::cast_precision_loss)] // month indices are small

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use dreamy_core::constants::fitness;
use dreamy_core::models::{Activity, RaceResult};
use serde::{Deserialize, Serialize};

use crate::algorithms::VdotAlgorithm;
use crate::records::RecordSource;
use crate::statistics::linear_regression;

/// Source of a performance
pub type PerformanceSource = RecordSource;

/// A timed effort over a known distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Distance in meters
    pub distance_meters: f64,
    /// Time in seconds
    pub seconds: f64,
    /// Day of the effort
    pub date: NaiveDate,
    /// Where it came from
    pub source: PerformanceSource,
    /// Activity or race name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Performance {
    /// Collect performances from running activities and race results
    #[must_use]
    pub fn collect(activities: &[Activity], races: &[RaceResult]) -> Vec<Self> {
        let mut performances = Vec::new();
        for activity in activities.iter().filter(|a| a.is_run()) {
            if activity.moving_seconds > 0 {
                performances.push(Self {
                    distance_meters: activity.distance_meters,
                    seconds: f64::from(activity.moving_seconds),
                    date: activity.start_date.date_naive(),
                    source: RecordSource::Activity,
                    name: Some(activity.name.clone()),
                });
            }
            performances.extend(
                activity
                    .best_efforts
                    .iter()
                    .filter(|e| e.elapsed_seconds > 0)
                    .map(|e| Self {
                        distance_meters: e.distance_meters,
                        seconds: f64::from(e.elapsed_seconds),
                        date: e.start_date.date_naive(),
                        source: RecordSource::BestEffort,
                        name: Some(format!("{} ({})", activity.name, e.name)),
                    }),
            );
        }
        performances.extend(races.iter().map(|r| Self {
            distance_meters: r.distance_meters,
            seconds: f64::from(r.finish_seconds),
            date: r.race_date,
            source: RecordSource::Race,
            name: Some(r.name.clone()),
        }));
        performances
    }
}

/// Best VDOT found and the effort that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessEstimate {
    /// VDOT value
    pub vdot: f64,
    /// Effort it came from
    pub performance: Performance,
}

/// Best VDOT within one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPoint {
    /// First day of the period
    pub period_start: NaiveDate,
    /// Best VDOT in the period
    pub vdot: f64,
    /// Effort it came from
    pub performance: Performance,
}

/// Direction and strength of the VDOT history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessTrend {
    /// VDOT change per period
    pub slope_per_period: f64,
    /// Fit quality
    pub r_squared: f64,
}

/// History of best VDOT per period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// One point per period with a qualifying effort, oldest first
    pub points: Vec<FitnessPoint>,
    /// Least-squares trend when at least three periods exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<FitnessTrend>,
}

/// History bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBucket {
    /// Calendar month
    #[default]
    Month,
    /// ISO week starting Monday
    Week,
}

impl HistoryBucket {
    fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
        }
    }

    fn index_of(self, origin: NaiveDate, start: NaiveDate) -> f64 {
        match self {
            Self::Month => {
                let months = i64::from(start.year() - origin.year()) * 12
                    + i64::from(start.month())
                    - i64::from(origin.month());
                months as f64
            }
            Self::Week => (start - origin).num_days() as f64 / 7.0,
        }
    }
}

/// VDOT-based fitness estimation
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEstimator {
    algorithm: VdotAlgorithm,
}

impl FitnessEstimator {
    /// Create an estimator with a VDOT algorithm
    #[must_use]
    pub const fn new(algorithm: VdotAlgorithm) -> Self {
        Self { algorithm }
    }

    fn qualifies(performance: &Performance) -> bool {
        performance.distance_meters >= fitness::MIN_PERFORMANCE_METERS
    }

    fn score(&self, performance: &Performance) -> Option<f64> {
        if !Self::qualifies(performance) {
            return None;
        }
        self.algorithm
            .calculate_vdot(performance.distance_meters, performance.seconds)
            .ok()
    }

    /// Highest VDOT among efforts in `(as_of - window_days, as_of]`
    ///
    /// Efforts shorter than 1500 m are ignored. Race results win ties.
    #[must_use]
    pub fn estimate(
        &self,
        performances: &[Performance],
        as_of: NaiveDate,
        window_days: u32,
    ) -> Option<FitnessEstimate> {
        let earliest = as_of - Duration::days(i64::from(window_days));
        performances
            .iter()
            .filter(|p| p.date > earliest && p.date <= as_of)
            .filter_map(|p| self.score(p).map(|vdot| (vdot, p)))
            .max_by(|(va, pa), (vb, pb)| {
                va.total_cmp(vb)
                    .then_with(|| pa.source.priority().cmp(&pb.source.priority()))
            })
            .map(|(vdot, performance)| FitnessEstimate {
                vdot,
                performance: performance.clone(),
            })
    }

    /// Best VDOT per bucket, chronological, with a trend over three or more buckets
    #[must_use]
    pub fn history(&self, performances: &[Performance], bucket: HistoryBucket) -> FitnessHistory {
        let mut best: BTreeMap<NaiveDate, (f64, &Performance)> = BTreeMap::new();
        for performance in performances {
            let Some(vdot) = self.score(performance) else {
                continue;
            };
            let period = bucket.start_of(performance.date);
            let replace = match best.get(&period) {
                Some((current, existing)) => {
                    vdot > *current
                        || (vdot.total_cmp(current).is_eq()
                            && performance.source.priority() > existing.source.priority())
                }
                None => true,
            };
            if replace {
                best.insert(period, (vdot, performance));
            }
        }

        let points: Vec<FitnessPoint> = best
            .into_iter()
            .map(|(period_start, (vdot, performance))| FitnessPoint {
                period_start,
                vdot,
                performance: performance.clone(),
            })
            .collect();

        let trend = points.first().and_then(|first| {
            if points.len() < 3 {
                return None;
            }
            let xy: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (bucket.index_of(first.period_start, p.period_start), p.vdot))
                .collect();
            linear_regression(&xy).map(|fit| FitnessTrend {
                slope_per_period: fit.slope,
                r_squared: fit.r_squared,
            })
        });

        FitnessHistory { points, trend }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(distance: f64, seconds: f64, date: NaiveDate, source: RecordSource) -> Performance {
        Performance {
            distance_meters: distance,
            seconds,
            date,
            source,
            name: None,
        }
    }

    #[test]
    fn test_short_and_stale_efforts_ignored() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let performances = vec![
            perf(1000.0, 180.0, today, RecordSource::BestEffort),
            perf(5000.0, 1100.0, today - Duration::days(400), RecordSource::Race),
            perf(5000.0, 1300.0, today - Duration::days(10), RecordSource::Activity),
        ];
        let estimate = FitnessEstimator::default()
            .estimate(&performances, today, 120)
            .unwrap();
        assert_eq!(estimate.performance.seconds, 1300.0);
    }

    #[test]
    fn test_race_wins_tie() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let performances = vec![
            perf(5000.0, 1200.0, day, RecordSource::Activity),
            perf(5000.0, 1200.0, day, RecordSource::Race),
        ];
        let estimate = FitnessEstimator::default()
            .estimate(&performances, day, 30)
            .unwrap();
        assert_eq!(estimate.performance.source, RecordSource::Race);
    }
}
