// ABOUTME: Personal record extraction across races, Strava best efforts and whole activities
// ABOUTME: Resolves ties by source priority and date, and tracks record progressions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use dreamy_core::models::{Activity, BestEffort, RaceResult};
use dreamy_core::units::{StandardDistance, METERS_PER_KM};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithms::VdotAlgorithm;

/// Tolerance when a best effort has an unrecognized name
const BEST_EFFORT_TOLERANCE: f64 = 0.01;
/// Shortest acceptable race/activity relative to the standard distance
const WHOLE_EFFORT_LOW: f64 = 0.99;
/// Longest acceptable race/activity relative to the standard distance
const WHOLE_EFFORT_HIGH: f64 = 1.03;

/// Where a mark came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Official race result
    Race,
    /// Strava best effort inside an activity
    BestEffort,
    /// Whole activity close to a standard distance
    Activity,
}

impl RecordSource {
    /// Tie-break priority, higher wins
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Race => 3,
            Self::BestEffort => 2,
            Self::Activity => 1,
        }
    }
}

/// One mark at a standard distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Standard distance
    pub distance: StandardDistance,
    /// Time in seconds
    pub seconds: u32,
    /// Pace in seconds per kilometer over the standard distance
    pub pace_seconds_per_km: f64,
    /// Day the mark was set
    pub date: NaiveDate,
    /// Source of the mark
    pub source: RecordSource,
    /// Activity the mark came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<Uuid>,
    /// Race the mark came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_id: Option<Uuid>,
    /// Activity or race name
    pub name: String,
    /// VDOT implied by the mark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdot: Option<f64>,
}

impl PersonalRecord {
    fn new(
        distance: StandardDistance,
        seconds: u32,
        date: NaiveDate,
        source: RecordSource,
        name: String,
    ) -> Self {
        let meters = distance.meters();
        Self {
            distance,
            seconds,
            pace_seconds_per_km: f64::from(seconds) / meters * METERS_PER_KM,
            date,
            source,
            activity_id: None,
            race_id: None,
            name,
            vdot: VdotAlgorithm::Daniels
                .calculate_vdot(meters, f64::from(seconds))
                .ok(),
        }
    }

    /// Ordering where `Less` is the better mark
    fn rank(&self, other: &Self) -> Ordering {
        self.seconds
            .cmp(&other.seconds)
            .then_with(|| other.source.priority().cmp(&self.source.priority()))
            .then_with(|| self.date.cmp(&other.date))
    }
}

/// Chronological marks that each improved on all earlier ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Standard distance
    pub distance: StandardDistance,
    /// Improving marks, oldest first
    pub marks: Vec<PersonalRecord>,
}

/// Best marks per standard distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecordBook {
    /// Current records, shortest distance first
    pub records: Vec<PersonalRecord>,
    /// Record history per distance
    pub progressions: Vec<Progression>,
}

impl PersonalRecordBook {
    /// Build the record book from activities (with their best efforts) and races
    #[must_use]
    pub fn build(activities: &[Activity], races: &[RaceResult]) -> Self {
        let mut by_distance: BTreeMap<StandardDistance, Vec<PersonalRecord>> = BTreeMap::new();
        for mark in collect_marks(activities, races) {
            by_distance.entry(mark.distance).or_default().push(mark);
        }

        let mut records = Vec::new();
        let mut progressions = Vec::new();
        for (distance, mut marks) in by_distance {
            if let Some(best) = marks.iter().min_by(|a, b| a.rank(b)) {
                records.push(best.clone());
            }

            marks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.rank(b)));
            let mut improving: Vec<PersonalRecord> = Vec::new();
            for mark in marks {
                let improves = match improving.last() {
                    Some(prev) => mark.seconds < prev.seconds,
                    None => true,
                };
                if improves {
                    improving.push(mark);
                }
            }
            progressions.push(Progression {
                distance,
                marks: improving,
            });
        }

        Self {
            records,
            progressions,
        }
    }

    /// Current record at a distance
    #[must_use]
    pub fn record(&self, distance: StandardDistance) -> Option<&PersonalRecord> {
        self.records.iter().find(|r| r.distance == distance)
    }

    /// Records set on or after `since`
    #[must_use]
    pub fn recent(&self, since: NaiveDate) -> Vec<&PersonalRecord> {
        self.records.iter().filter(|r| r.date >= since).collect()
    }
}

fn best_effort_distance(effort: &BestEffort) -> Option<StandardDistance> {
    StandardDistance::from_strava_name(&effort.name).or_else(|| {
        StandardDistance::within_tolerance(effort.distance_meters, BEST_EFFORT_TOLERANCE)
    })
}

fn collect_marks(activities: &[Activity], races: &[RaceResult]) -> Vec<PersonalRecord> {
    let mut marks = Vec::new();

    for activity in activities.iter().filter(|a| a.is_run()) {
        for effort in &activity.best_efforts {
            if effort.elapsed_seconds == 0 {
                continue;
            }
            if let Some(distance) = best_effort_distance(effort) {
                let mut mark = PersonalRecord::new(
                    distance,
                    effort.elapsed_seconds,
                    effort.start_date.date_naive(),
                    RecordSource::BestEffort,
                    activity.name.clone(),
                );
                mark.activity_id = Some(effort.activity_id.unwrap_or(activity.id));
                marks.push(mark);
            }
        }

        let seconds = if activity.elapsed_seconds > 0 {
            activity.elapsed_seconds
        } else {
            activity.moving_seconds
        };
        if seconds == 0 {
            continue;
        }
        if let Some(distance) =
            StandardDistance::matching(activity.distance_meters, WHOLE_EFFORT_LOW, WHOLE_EFFORT_HIGH)
        {
            let mut mark = PersonalRecord::new(
                distance,
                seconds,
                activity.start_date.date_naive(),
                RecordSource::Activity,
                activity.name.clone(),
            );
            mark.activity_id = Some(activity.id);
            marks.push(mark);
        }
    }

    for race in races.iter().filter(|r| r.finish_seconds > 0) {
        if let Some(distance) =
            StandardDistance::matching(race.distance_meters, WHOLE_EFFORT_LOW, WHOLE_EFFORT_HIGH)
        {
            let mut mark = PersonalRecord::new(
                distance,
                race.finish_seconds,
                race.race_date,
                RecordSource::Race,
                race.name.clone(),
            );
            mark.race_id = Some(race.id);
            mark.activity_id = race.activity_id;
            marks.push(mark);
        }
    }

    marks
}
