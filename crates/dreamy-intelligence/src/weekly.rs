// ABOUTME: Per-ISO-week running volume and stress summaries
// ABOUTME: Weeks start on Monday; empty weeks inside the range are reported with zeros
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use dreamy_core::models::Activity;
use dreamy_core::units::METERS_PER_KM;
use serde::{Deserialize, Serialize};

use crate::stress::StressScore;

/// Totals for one ISO week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Monday of the week
    pub week_start: NaiveDate,
    /// ISO week-numbering year
    pub iso_year: i32,
    /// ISO week number
    pub iso_week: u32,
    /// Running distance in meters
    pub distance_meters: f64,
    /// Running moving time in seconds
    pub moving_seconds: u64,
    /// Number of runs
    pub run_count: u32,
    /// Longest single run in meters
    pub longest_run_meters: f64,
    /// Average running pace, `None` without runs
    pub average_pace_seconds_per_km: Option<f64>,
    /// Stress from all activities that week
    pub tss: f64,
}

impl WeeklySummary {
    fn empty(week_start: NaiveDate) -> Self {
        let iso = week_start.iso_week();
        Self {
            week_start,
            iso_year: iso.year(),
            iso_week: iso.week(),
            distance_meters: 0.0,
            moving_seconds: 0,
            run_count: 0,
            longest_run_meters: 0.0,
            average_pace_seconds_per_km: None,
            tss: 0.0,
        }
    }
}

/// Monday of the week containing `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Summaries for every week touching `from..=to`, oldest first
///
/// Activities and scores outside the range are skipped. Only runs count
/// toward volume; stress counts for every activity.
#[must_use]
pub fn weekly_summaries(
    activities: &[Activity],
    scores: &[StressScore],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<WeeklySummary> {
    if to < from {
        return Vec::new();
    }
    let in_range = |day: NaiveDate| day >= from && day <= to;

    let mut weeks: BTreeMap<NaiveDate, WeeklySummary> = BTreeMap::new();
    let mut monday = week_start(from);
    while monday <= to {
        weeks.insert(monday, WeeklySummary::empty(monday));
        monday += Duration::days(7);
    }

    for activity in activities.iter().filter(|a| a.is_run()) {
        let day = activity.start_date.date_naive();
        if !in_range(day) {
            continue;
        }
        if let Some(week) = weeks.get_mut(&week_start(day)) {
            week.distance_meters += activity.distance_meters;
            week.moving_seconds += u64::from(activity.moving_seconds);
            week.run_count += 1;
            week.longest_run_meters = week.longest_run_meters.max(activity.distance_meters);
        }
    }

    for score in scores {
        let day = score.date.date_naive();
        if !in_range(day) {
            continue;
        }
        if let Some(week) = weeks.get_mut(&week_start(day)) {
            week.tss += score.tss;
        }
    }

    weeks
        .into_values()
        .map(|mut week| {
            if week.distance_meters > 0.0 && week.moving_seconds > 0 {
                week.average_pace_seconds_per_km =
                    Some(week.moving_seconds as f64 / week.distance_meters * METERS_PER_KM);
            }
            week
        })
        .collect()
}
