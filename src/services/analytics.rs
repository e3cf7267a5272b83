// ABOUTME: Analytics orchestration: loads a user's rows and runs the intelligence calculators
// ABOUTME: Fills missing profile thresholds from detection before scoring training stress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use chrono::{Duration, NaiveDate};
use dreamy_core::constants::{fitness, load};
use dreamy_core::errors::AppResult;
use dreamy_core::models::{Activity, AthleteProfile, RaceResult};
use dreamy_intelligence::algorithms::{
    race_equivalents, training_paces, RaceEquivalent, TrainingPaces,
};
use dreamy_intelligence::load::window_start;
use dreamy_intelligence::threshold::observed_max_heart_rate;
use dreamy_intelligence::{
    week_start, weekly_summaries, DailyLoad, FitnessEstimate, FitnessEstimator, FitnessHistory,
    HeartRateZones, HistoryBucket, Performance, PersonalRecord, PersonalRecordBook,
    StressCalculator, ThresholdDetector, ThresholdEstimate, TrainingLoadAlgorithm,
    TrainingLoadCalculator, TrainingLoadSummary, TssDataPoint, VdotAlgorithm, WeeklySummary,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::database::{ActivityFilter, Database};

/// Days back the dashboard looks for new records
const RECENT_RECORD_DAYS: i64 = 30;
/// Weeks shown on the dashboard
const DASHBOARD_WEEKS: u32 = 4;

/// Options for the fitness report
#[derive(Debug, Clone, Copy)]
pub struct FitnessQuery {
    /// Look-back window for the current estimate
    pub window_days: u32,
    /// VDOT formula
    pub algorithm: VdotAlgorithm,
    /// History bucket size
    pub bucket: HistoryBucket,
}

impl Default for FitnessQuery {
    fn default() -> Self {
        Self {
            window_days: fitness::DEFAULT_WINDOW_DAYS,
            algorithm: VdotAlgorithm::default(),
            bucket: HistoryBucket::default(),
        }
    }
}

/// Options for the load report
#[derive(Debug, Clone, Copy)]
pub struct LoadQuery {
    /// Days in the returned series
    pub days: u32,
    /// Averaging model
    pub algorithm: TrainingLoadAlgorithm,
}

impl Default for LoadQuery {
    fn default() -> Self {
        Self {
            days: load::DEFAULT_SERIES_DAYS,
            algorithm: TrainingLoadAlgorithm::default(),
        }
    }
}

/// Current fitness with derived paces and predictions
#[derive(Debug, Clone, Serialize)]
pub struct FitnessReport {
    /// Reference day
    pub as_of: NaiveDate,
    /// Window used for the current estimate
    pub window_days: u32,
    /// VDOT formula name
    pub algorithm: &'static str,
    /// Best effort in the window
    pub current: Option<FitnessEstimate>,
    /// Daniels training paces for the current VDOT
    pub training_paces: Option<TrainingPaces>,
    /// Equivalent race times for the current VDOT
    pub race_equivalents: Vec<RaceEquivalent>,
    /// VDOT per period with trend
    pub history: FitnessHistory,
}

/// CTL/ATL/TSB series and its latest state
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Averaging model name
    pub algorithm: &'static str,
    /// One entry per day, oldest first
    pub series: Vec<DailyLoad>,
    /// State on the last day
    pub summary: Option<TrainingLoadSummary>,
}

/// Where the zone anchor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Set by the athlete
    Profile,
    /// Detected from splits
    Detected,
}

/// Threshold detection result and the zones in use
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    /// Detection from recent runs
    pub estimate: Option<ThresholdEstimate>,
    /// LTHR anchoring the zones
    pub lthr: Option<f64>,
    /// Origin of `lthr`
    pub lthr_source: Option<ThresholdSource>,
    /// Heart rate zones around `lthr`
    pub zones: Option<HeartRateZones>,
}

/// Weekly summaries, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    /// Summaries
    pub weeks: Vec<WeeklySummary>,
}

/// Combined snapshot for the athlete's home screen
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Reference day
    pub as_of: NaiveDate,
    /// Stored activities of any sport
    pub activity_count: usize,
    /// Most recent activity
    pub last_activity: Option<Activity>,
    /// Current VDOT estimate
    pub fitness: Option<FitnessEstimate>,
    /// Current load state
    pub load: Option<TrainingLoadSummary>,
    /// Threshold and zones
    pub threshold: ThresholdReport,
    /// Records set in the last 30 days
    pub recent_records: Vec<PersonalRecord>,
    /// Last four weeks
    pub weeks: Vec<WeeklySummary>,
}

/// Rows needed by the calculators
struct AthleteData {
    profile: AthleteProfile,
    activities: Vec<Activity>,
    races: Vec<RaceResult>,
}

impl AthleteData {
    fn runs(&self) -> Vec<Activity> {
        self.activities.iter().filter(|a| a.is_run()).cloned().collect()
    }
}

/// Runs the analytics for one athlete at a time
#[derive(Clone)]
pub struct AnalyticsService {
    database: Database,
    fitness_window_days: u32,
}

impl AnalyticsService {
    /// Create the service
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self {
            database,
            fitness_window_days: fitness::DEFAULT_WINDOW_DAYS,
        }
    }

    /// Default look-back window for fitness estimates
    #[must_use]
    pub fn with_fitness_window(mut self, days: u32) -> Self {
        self.fitness_window_days = days;
        self
    }

    /// Fitness options using the configured window
    #[must_use]
    pub fn default_fitness_query(&self) -> FitnessQuery {
        FitnessQuery {
            window_days: self.fitness_window_days,
            ..FitnessQuery::default()
        }
    }

    async fn load(&self, user_id: Uuid) -> AppResult<AthleteData> {
        let profile = self.database.get_profile_or_default(user_id).await?;
        let activities = self
            .database
            .list_activities(user_id, &ActivityFilter::default())
            .await?;
        let races = self.database.list_races(user_id).await?;
        debug!(%user_id, activities = activities.len(), races = races.len(), "Loaded analytics inputs");
        Ok(AthleteData {
            profile,
            activities,
            races,
        })
    }

    /// Current VDOT, training paces, race equivalents and history
    ///
    /// # Errors
    ///
    /// Returns a database error if the athlete's rows cannot be loaded
    pub async fn fitness(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        query: FitnessQuery,
    ) -> AppResult<FitnessReport> {
        let data = self.load(user_id).await?;
        Ok(fitness_report(&data, today, query))
    }

    /// Daily CTL/ATL/TSB for the last `query.days` days ending `today`
    ///
    /// # Errors
    ///
    /// Returns a database error, or invalid input for a zero-day window
    pub async fn load_series(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        query: LoadQuery,
    ) -> AppResult<LoadReport> {
        let data = self.load(user_id).await?;
        load_report(&data, today, query)
    }

    /// Threshold estimate and zones
    ///
    /// # Errors
    ///
    /// Returns a database error if the athlete's rows cannot be loaded
    pub async fn threshold(&self, user_id: Uuid) -> AppResult<ThresholdReport> {
        let data = self.load(user_id).await?;
        Ok(threshold_report(&data))
    }

    /// Personal records and their progressions
    ///
    /// # Errors
    ///
    /// Returns a database error if the athlete's rows cannot be loaded
    pub async fn records(&self, user_id: Uuid) -> AppResult<PersonalRecordBook> {
        let data = self.load(user_id).await?;
        Ok(PersonalRecordBook::build(&data.activities, &data.races))
    }

    /// Summaries for the last `weeks` ISO weeks up to `today`
    ///
    /// # Errors
    ///
    /// Returns a database error if the athlete's rows cannot be loaded
    pub async fn weekly(&self, user_id: Uuid, today: NaiveDate, weeks: u32) -> AppResult<WeeklyReport> {
        let data = self.load(user_id).await?;
        Ok(WeeklyReport {
            weeks: weekly_report(&data, today, weeks),
        })
    }

    /// Everything the home screen needs in one call
    ///
    /// # Errors
    ///
    /// Returns a database error if the athlete's rows cannot be loaded
    pub async fn dashboard(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Dashboard> {
        let data = self.load(user_id).await?;

        let fitness = fitness_report(&data, today, self.default_fitness_query()).current;
        let load = load_report(&data, today, LoadQuery::default())?.summary;
        let book = PersonalRecordBook::build(&data.activities, &data.races);
        let recent_records = book
            .recent(today - Duration::days(RECENT_RECORD_DAYS))
            .into_iter()
            .cloned()
            .collect();

        Ok(Dashboard {
            as_of: today,
            activity_count: data.activities.len(),
            last_activity: data.activities.first().cloned(),
            fitness,
            load,
            threshold: threshold_report(&data),
            recent_records,
            weeks: weekly_report(&data, today, DASHBOARD_WEEKS),
        })
    }
}

/// Profile with missing thresholds filled from the data
///
/// Explicit profile values always win over detection.
#[must_use]
pub fn effective_profile(profile: &AthleteProfile, activities: &[Activity]) -> AthleteProfile {
    let mut effective = profile.clone();
    let thresholds_known =
        effective.threshold_heart_rate.is_some() && effective.threshold_pace_seconds_per_km.is_some();
    if !thresholds_known {
        if let Some(estimate) = ThresholdDetector::detect(activities) {
            if effective.threshold_heart_rate.is_none() {
                effective.threshold_heart_rate = Some(estimate.lthr);
            }
            if effective.threshold_pace_seconds_per_km.is_none() {
                effective.threshold_pace_seconds_per_km = estimate.threshold_pace_seconds_per_km;
            }
        }
    }
    if effective.max_heart_rate.is_none() {
        effective.max_heart_rate = observed_max_heart_rate(activities);
    }
    effective
}

fn fitness_report(data: &AthleteData, today: NaiveDate, query: FitnessQuery) -> FitnessReport {
    let estimator = FitnessEstimator::new(query.algorithm);
    let performances = Performance::collect(&data.activities, &data.races);
    let current = estimator.estimate(&performances, today, query.window_days);
    let (paces, equivalents) = current.as_ref().map_or((None, Vec::new()), |estimate| {
        (
            training_paces(estimate.vdot).ok(),
            race_equivalents(estimate.vdot).unwrap_or_default(),
        )
    });

    FitnessReport {
        as_of: today,
        window_days: query.window_days,
        algorithm: query.algorithm.name(),
        current,
        training_paces: paces,
        race_equivalents: equivalents,
        history: estimator.history(&performances, query.bucket),
    }
}

fn stress_points(data: &AthleteData) -> Vec<TssDataPoint> {
    let profile = effective_profile(&data.profile, &data.runs());
    StressCalculator::score_all(&data.activities, &profile)
        .iter()
        .map(TssDataPoint::from)
        .collect()
}

fn load_report(data: &AthleteData, today: NaiveDate, query: LoadQuery) -> AppResult<LoadReport> {
    let points = stress_points(data);
    let calculator = TrainingLoadCalculator::new(query.algorithm);
    let series = calculator.series(&points, window_start(today, query.days), today)?;
    let summary = TrainingLoadSummary::from_series(&series);
    Ok(LoadReport {
        algorithm: query.algorithm.name(),
        series,
        summary,
    })
}

fn threshold_report(data: &AthleteData) -> ThresholdReport {
    let estimate = ThresholdDetector::detect(&data.runs());
    let (lthr, lthr_source) = match (data.profile.threshold_heart_rate, &estimate) {
        (Some(lthr), _) => (Some(lthr), Some(ThresholdSource::Profile)),
        (None, Some(estimate)) => (Some(estimate.lthr), Some(ThresholdSource::Detected)),
        (None, None) => (None, None),
    };
    ThresholdReport {
        estimate,
        lthr,
        lthr_source,
        zones: lthr.map(HeartRateZones::from_lthr),
    }
}

fn weekly_report(data: &AthleteData, today: NaiveDate, weeks: u32) -> Vec<WeeklySummary> {
    let weeks = weeks.max(1);
    let from = week_start(today) - Duration::weeks(i64::from(weeks - 1));
    let profile = effective_profile(&data.profile, &data.runs());
    let scores = StressCalculator::score_all(&data.activities, &profile);
    weekly_summaries(&data.activities, &scores, from, today)
}
