// ABOUTME: In-memory StravaApi for sync and webhook tests
// ABOUTME: Serves scripted summaries and details and records what was asked for
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dreamy::errors::{AppError, AppResult, ErrorCode};
use dreamy::providers::{
    StravaActivity, StravaApi, StravaAthlete, StravaBestEffort, StravaSplit,
};

#[derive(Default)]
struct State {
    summaries: Vec<StravaActivity>,
    details: HashMap<i64, StravaActivity>,
    failing_details: HashMap<i64, ErrorCode>,
    list_calls: Vec<(Option<DateTime<Utc>>, u32, u32)>,
    detail_calls: Vec<i64>,
    tokens_seen: Vec<String>,
}

/// Scripted Strava API
#[derive(Default)]
pub struct FakeStravaApi {
    state: Mutex<State>,
}

impl FakeStravaApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an activity to the listing (newest first is not required)
    pub fn add_summary(&self, activity: StravaActivity) {
        self.state.lock().unwrap().summaries.push(activity);
    }

    /// Detail returned for `activity.id`
    pub fn add_detail(&self, activity: StravaActivity) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(activity.id, activity);
    }

    /// Make the detail endpoint fail for `id`
    pub fn fail_detail(&self, id: i64, code: ErrorCode) {
        self.state.lock().unwrap().failing_details.insert(id, code);
    }

    pub fn list_calls(&self) -> Vec<(Option<DateTime<Utc>>, u32, u32)> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn detail_calls(&self) -> Vec<i64> {
        self.state.lock().unwrap().detail_calls.clone()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens_seen.clone()
    }
}

#[async_trait]
impl StravaApi for FakeStravaApi {
    async fn list_activities(
        &self,
        access_token: &str,
        after: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> AppResult<Vec<StravaActivity>> {
        let mut state = self.state.lock().unwrap();
        state.tokens_seen.push(access_token.to_owned());
        state.list_calls.push((after, page, per_page));

        let mut matching: Vec<StravaActivity> = state
            .summaries
            .iter()
            .filter(|a| after.map_or(true, |after| a.start_date > after))
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.start_date);

        let skip = ((page.max(1) - 1) * per_page) as usize;
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .collect())
    }

    async fn get_activity(&self, access_token: &str, id: i64) -> AppResult<StravaActivity> {
        let mut state = self.state.lock().unwrap();
        state.tokens_seen.push(access_token.to_owned());
        state.detail_calls.push(id);
        if let Some(code) = state.failing_details.get(&id) {
            return Err(AppError::new(*code, "scripted detail failure"));
        }
        state
            .details
            .get(&id)
            .or_else(|| state.summaries.iter().find(|a| a.id == id))
            .cloned()
            .ok_or_else(|| AppError::not_found("Strava resource"))
    }

    async fn get_athlete(&self, access_token: &str) -> AppResult<StravaAthlete> {
        self.state
            .lock()
            .unwrap()
            .tokens_seen
            .push(access_token.to_owned());
        Ok(StravaAthlete {
            id: 4242,
            username: Some("runner".to_owned()),
            firstname: None,
            lastname: None,
            sex: Some("F".to_owned()),
        })
    }
}

/// A Strava run summary `days_ago` days before now
pub fn strava_run(id: i64, days_ago: i64, meters: f64, seconds: u32) -> StravaActivity {
    StravaActivity {
        id,
        name: format!("Run {id}"),
        activity_type: Some("Run".to_owned()),
        sport_type: Some("Run".to_owned()),
        start_date: Utc::now() - Duration::days(days_ago),
        distance: meters,
        moving_time: seconds,
        elapsed_time: seconds + 30,
        total_elevation_gain: Some(12.0),
        average_heartrate: Some(150.0),
        max_heartrate: Some(172.0),
        workout_type: Some(0),
        splits_metric: Vec::new(),
        best_efforts: Vec::new(),
    }
}

/// A Strava ride summary
pub fn strava_ride(id: i64, days_ago: i64) -> StravaActivity {
    StravaActivity {
        name: format!("Ride {id}"),
        activity_type: Some("Ride".to_owned()),
        sport_type: Some("Ride".to_owned()),
        workout_type: None,
        ..strava_run(id, days_ago, 30_000.0, 3600)
    }
}

/// Add splits and a 5k best effort to a summary, as the detail endpoint would
pub fn with_detail(mut activity: StravaActivity) -> StravaActivity {
    let splits = (activity.distance / 1000.0).floor() as u32;
    let per_split = activity.moving_time / splits.max(1);
    activity.splits_metric = (1..=splits)
        .map(|split| StravaSplit {
            split,
            distance: 1000.0,
            elapsed_time: per_split,
            moving_time: per_split,
            average_heartrate: Some(150.0),
            elevation_difference: Some(0.0),
        })
        .collect();
    if activity.distance >= 5000.0 {
        activity.best_efforts = vec![StravaBestEffort {
            name: "5k".to_owned(),
            distance: 5000.0,
            elapsed_time: per_split * 5,
            start_date: activity.start_date,
        }];
    }
    activity
}
