// ABOUTME: CTL/ATL/TSB daily series built from per-activity stress
// ABOUTME: Summaries add ramp rate, acute:chronic ratio, training status and overtraining risk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dreamy_core::constants::load;
use dreamy_core::errors::AppResult;
use serde::{Deserialize, Serialize};

use crate::algorithms::TrainingLoadAlgorithm;
use crate::stress::StressScore;

/// TSS data point with timestamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TssDataPoint {
    /// When the session happened
    pub date: DateTime<Utc>,
    /// Training Stress Score for this session
    pub tss: f64,
}

impl From<&StressScore> for TssDataPoint {
    fn from(score: &StressScore) -> Self {
        Self {
            date: score.date,
            tss: score.tss,
        }
    }
}

/// Load values for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    /// UTC calendar day
    pub date: NaiveDate,
    /// Stress accumulated that day
    pub tss: f64,
    /// Chronic training load (fitness)
    pub ctl: f64,
    /// Acute training load (fatigue)
    pub atl: f64,
    /// Training stress balance (form), `ctl - atl` on the same day
    pub tsb: f64,
}

/// Calculator for training load series
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingLoadCalculator {
    algorithm: TrainingLoadAlgorithm,
    seed_ctl: f64,
    seed_atl: f64,
}

impl TrainingLoadCalculator {
    /// Create a calculator for an algorithm, seeded at zero
    #[must_use]
    pub const fn new(algorithm: TrainingLoadAlgorithm) -> Self {
        Self {
            algorithm,
            seed_ctl: 0.0,
            seed_atl: 0.0,
        }
    }

    /// Start from known loads instead of zero
    #[must_use]
    pub const fn with_seed(mut self, ctl: f64, atl: f64) -> Self {
        self.seed_ctl = ctl;
        self.seed_atl = atl;
        self
    }

    /// Algorithm in use
    #[must_use]
    pub const fn algorithm(&self) -> TrainingLoadAlgorithm {
        self.algorithm
    }

    /// Build the daily series for `start..=end`
    ///
    /// Stress is summed per UTC day. Points before `start` warm the averages
    /// up but are not emitted. Points after `end` are ignored. Every day is
    /// advanced, so rest days decay the load. Input order does not matter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when a window size is zero.
    pub fn series(
        &self,
        points: &[TssDataPoint],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyLoad>> {
        self.algorithm.validate()?;
        if end < start {
            return Ok(Vec::new());
        }

        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for point in points.iter().filter(|p| p.tss.is_finite()) {
            let day = point.date.date_naive();
            if day <= end {
                *per_day.entry(day).or_insert(0.0) += point.tss.max(0.0);
            }
        }

        let first = per_day
            .keys()
            .next()
            .copied()
            .map_or(start, |day| day.min(start));
        let days: Vec<NaiveDate> = first
            .iter_days()
            .take_while(|day| *day <= end)
            .collect();
        let daily_tss: Vec<f64> = days
            .iter()
            .map(|day| per_day.get(day).copied().unwrap_or(0.0))
            .collect();

        let ctl = self
            .algorithm
            .smooth(&daily_tss, self.algorithm.ctl_days(), self.seed_ctl);
        let atl = self
            .algorithm
            .smooth(&daily_tss, self.algorithm.atl_days(), self.seed_atl);

        Ok(days
            .iter()
            .zip(daily_tss.iter().zip(ctl.iter().zip(atl.iter())))
            .filter(|(day, _)| **day >= start)
            .map(|(day, (tss, (ctl, atl)))| DailyLoad {
                date: *day,
                tss: *tss,
                ctl: *ctl,
                atl: *atl,
                tsb: ctl - atl,
            })
            .collect())
    }

    /// Interpret TSB value and provide status
    #[must_use]
    pub fn interpret_tsb(tsb: f64) -> TrainingStatus {
        if tsb < -10.0 {
            TrainingStatus::Overreaching
        } else if tsb < 0.0 {
            TrainingStatus::Productive
        } else if tsb <= 10.0 {
            TrainingStatus::Fresh
        } else {
            TrainingStatus::Detraining
        }
    }

    /// Check if athlete is at risk of overtraining
    ///
    /// Warning conditions:
    /// - ATL > CTL x 1.3: Acute load spike
    /// - ATL > 150: Very high acute load
    /// - TSB < -10: Deep fatigue
    #[must_use]
    pub fn check_overtraining_risk(ctl: f64, atl: f64, tsb: f64) -> OvertrainingRisk {
        let mut risk_factors = Vec::new();

        if ctl > 0.0 && atl > ctl * 1.3 {
            risk_factors
                .push("Acute training load spike detected (>30% above chronic load)".to_owned());
        }
        if atl > 150.0 {
            risk_factors.push("Very high acute training load (>150 TSS/day)".to_owned());
        }
        if tsb < -10.0 {
            risk_factors.push("Deep fatigue detected (TSB < -10) - recovery needed".to_owned());
        }

        let risk_level = match risk_factors.len() {
            0 => RiskLevel::Low,
            1 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        };

        OvertrainingRisk {
            risk_level,
            risk_factors,
        }
    }

    /// Calculate recommended recovery days based on TSB
    #[must_use]
    pub fn recommend_recovery_days(tsb: f64) -> u32 {
        if tsb < -20.0 {
            5
        } else if tsb < -15.0 {
            3
        } else if tsb < -10.0 {
            2
        } else if tsb < 0.0 {
            1
        } else {
            0
        }
    }
}

/// Training status based on TSB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// TSB < -10: Overreaching, high fatigue
    Overreaching,
    /// TSB -10 to 0: Productive training zone
    Productive,
    /// TSB 0 to +10: Fresh, ready to perform
    Fresh,
    /// TSB > +10: Risk of detraining
    Detraining,
}

/// Risk level for overtraining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Low risk of overtraining
    Low,
    /// Moderate risk - monitor closely
    Moderate,
    /// High risk - rest recommended
    High,
}

/// Overtraining risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertrainingRisk {
    /// Overall risk level
    pub risk_level: RiskLevel,
    /// Specific risk factors identified
    pub risk_factors: Vec<String>,
}

/// Acute:chronic workload ratio band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcwrStatus {
    /// Below 0.8
    Undertrained,
    /// 0.8 to 1.3
    Optimal,
    /// 1.3 to 1.5
    Caution,
    /// Above 1.5
    HighRisk,
}

/// Acute:chronic workload ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acwr {
    /// ATL / CTL
    pub ratio: f64,
    /// Band the ratio falls in
    pub status: AcwrStatus,
}

impl Acwr {
    /// Ratio for the given loads, `None` while chronic load is zero
    #[must_use]
    pub fn from_loads(atl: f64, ctl: f64) -> Option<Self> {
        if ctl <= f64::EPSILON {
            return None;
        }
        let ratio = atl / ctl;
        let status = if ratio < 0.8 {
            AcwrStatus::Undertrained
        } else if ratio <= 1.3 {
            AcwrStatus::Optimal
        } else if ratio <= 1.5 {
            AcwrStatus::Caution
        } else {
            AcwrStatus::HighRisk
        };
        Some(Self { ratio, status })
    }
}

/// Snapshot of the most recent day of a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
    /// Day the snapshot describes
    pub date: NaiveDate,
    /// Current CTL
    pub ctl: f64,
    /// Current ATL
    pub atl: f64,
    /// Current TSB
    pub tsb: f64,
    /// CTL change over the last seven days
    pub ramp_rate: f64,
    /// Acute:chronic workload ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acwr: Option<Acwr>,
    /// Status from TSB
    pub status: TrainingStatus,
    /// Overtraining assessment
    pub overtraining_risk: OvertrainingRisk,
    /// Suggested easy days
    pub recovery_days: u32,
}

impl TrainingLoadSummary {
    /// Summarize a series, `None` when it is empty
    #[must_use]
    pub fn from_series(series: &[DailyLoad]) -> Option<Self> {
        let last = series.last()?;
        let reference = series
            .len()
            .checked_sub(load::RAMP_RATE_DAYS + 1)
            .map_or(&series[0], |i| &series[i]);
        Some(Self {
            date: last.date,
            ctl: last.ctl,
            atl: last.atl,
            tsb: last.tsb,
            ramp_rate: last.ctl - reference.ctl,
            acwr: Acwr::from_loads(last.atl, last.ctl),
            status: TrainingLoadCalculator::interpret_tsb(last.tsb),
            overtraining_risk: TrainingLoadCalculator::check_overtraining_risk(
                last.ctl, last.atl, last.tsb,
            ),
            recovery_days: TrainingLoadCalculator::recommend_recovery_days(last.tsb),
        })
    }
}

/// Convenience: first day of a window ending on `end`
#[must_use]
pub fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    end - Duration::days(i64::from(days.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(y: i32, m: u32, d: u32, tss: f64) -> TssDataPoint {
        TssDataPoint {
            date: Utc.with_ymd_and_hms(y, m, d, 7, 0, 0).unwrap(),
            tss,
        }
    }

    #[test]
    fn test_acwr_bands() {
        assert_eq!(Acwr::from_loads(70.0, 100.0).unwrap().status, AcwrStatus::Undertrained);
        assert_eq!(Acwr::from_loads(120.0, 100.0).unwrap().status, AcwrStatus::Optimal);
        assert_eq!(Acwr::from_loads(140.0, 100.0).unwrap().status, AcwrStatus::Caution);
        assert_eq!(Acwr::from_loads(160.0, 100.0).unwrap().status, AcwrStatus::HighRisk);
        assert!(Acwr::from_loads(10.0, 0.0).is_none());
    }

    #[test]
    fn test_series_runs_through_end() {
        let calc = TrainingLoadCalculator::default();
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let series = calc.series(&[point(2025, 3, 1, 100.0)], start, end).unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series.last().unwrap().date, end);
        assert!(series[9].atl < series[0].atl);
    }
}
