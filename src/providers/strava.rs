// ABOUTME: Strava REST API client and wire types
// ABOUTME: Converts Strava activities, splits and best efforts into stored activities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dreamy_core::constants::oauth::STRAVA;
use dreamy_core::errors::{AppError, AppResult};
use dreamy_core::models::{Activity, ActivitySource, BestEffort, Split, SportType, WorkoutType};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::utils::http_client::api_client;

/// Read access to the Strava API
///
/// Implemented by [`StravaClient`] and by test doubles.
#[async_trait]
pub trait StravaApi: Send + Sync {
    /// One page of the athlete's activities started after `after`
    async fn list_activities(
        &self,
        access_token: &str,
        after: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> AppResult<Vec<StravaActivity>>;

    /// Full activity including splits and best efforts
    async fn get_activity(&self, access_token: &str, id: i64) -> AppResult<StravaActivity>;

    /// The authenticated athlete
    async fn get_athlete(&self, access_token: &str) -> AppResult<StravaAthlete>;
}

/// HTTP implementation of [`StravaApi`]
pub struct StravaClient {
    client: reqwest::Client,
    base_url: String,
}

impl StravaClient {
    /// Create a client against `base_url` (normally `https://www.strava.com/api/v3`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: api_client(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "Strava API request");
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| {
            AppError::external_service(STRAVA, format!("Failed to parse response from {path}: {e}"))
        })
    }
}

#[async_trait]
impl StravaApi for StravaClient {
    async fn list_activities(
        &self,
        access_token: &str,
        after: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> AppResult<Vec<StravaActivity>> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(after) = after {
            query.push(("after", after.timestamp().to_string()));
        }
        let activities: Vec<StravaActivity> = self
            .get_json(access_token, "/athlete/activities", &query)
            .await?;
        debug!(page, count = activities.len(), "Fetched Strava activity page");
        Ok(activities)
    }

    async fn get_activity(&self, access_token: &str, id: i64) -> AppResult<StravaActivity> {
        self.get_json(
            access_token,
            &format!("/activities/{id}"),
            &[("include_all_efforts", "true".to_owned())],
        )
        .await
    }

    async fn get_athlete(&self, access_token: &str) -> AppResult<StravaAthlete> {
        self.get_json(access_token, "/athlete", &[]).await
    }
}

async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Strava API error response");

    Err(match status {
        StatusCode::UNAUTHORIZED => {
            AppError::auth_expired(format!("Strava rejected the access token: {body}"))
        }
        StatusCode::NOT_FOUND => AppError::not_found("Strava resource"),
        StatusCode::TOO_MANY_REQUESTS => AppError::external_rate_limited(STRAVA, retry_after),
        _ => AppError::external_service(STRAVA, format!("{status}: {body}")),
    })
}

/// Strava athlete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaAthlete {
    /// Athlete id
    pub id: i64,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
    /// First name
    #[serde(default)]
    pub firstname: Option<String>,
    /// Last name
    #[serde(default)]
    pub lastname: Option<String>,
    /// `M` or `F`
    #[serde(default)]
    pub sex: Option<String>,
}

/// Strava activity as returned by the list and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaActivity {
    /// Activity id
    pub id: i64,
    /// Title
    pub name: String,
    /// Legacy activity type
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    /// Current sport type
    #[serde(default)]
    pub sport_type: Option<String>,
    /// Start time
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Moving seconds
    #[serde(default)]
    pub moving_time: u32,
    /// Elapsed seconds
    #[serde(default)]
    pub elapsed_time: u32,
    /// Total climb in meters
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    /// Average heart rate
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    /// Maximum heart rate
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    /// Run workout flag (0 default, 1 race, 2 long, 3 workout)
    #[serde(default)]
    pub workout_type: Option<i64>,
    /// Metric splits, detail endpoint only
    #[serde(default)]
    pub splits_metric: Vec<StravaSplit>,
    /// Best efforts, detail endpoint only
    #[serde(default)]
    pub best_efforts: Vec<StravaBestEffort>,
}

/// One metric split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaSplit {
    /// 1-based split number
    pub split: u32,
    /// Meters
    pub distance: f64,
    /// Elapsed seconds
    pub elapsed_time: u32,
    /// Moving seconds
    #[serde(default)]
    pub moving_time: u32,
    /// Average heart rate
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    /// Net elevation change
    #[serde(default)]
    pub elevation_difference: Option<f64>,
}

/// One best effort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaBestEffort {
    /// Label such as "5k"
    pub name: String,
    /// Meters
    pub distance: f64,
    /// Elapsed seconds
    pub elapsed_time: u32,
    /// Start of the effort
    pub start_date: DateTime<Utc>,
}

impl StravaActivity {
    /// Sport type, preferring `sport_type` over the legacy `type`
    #[must_use]
    pub fn sport(&self) -> SportType {
        self.sport_type
            .as_deref()
            .or(self.activity_type.as_deref())
            .map_or(SportType::Other, SportType::from_strava)
    }

    /// Convert into a stored activity owned by `user_id`
    #[must_use]
    pub fn into_activity(self, user_id: Uuid) -> Activity {
        let sport_type = self.sport();
        let workout_type = if sport_type.is_running() {
            WorkoutType::from_strava(self.workout_type)
        } else {
            WorkoutType::Other
        };
        let now = Utc::now();

        Activity {
            id: Uuid::new_v4(),
            user_id,
            source: ActivitySource::Strava,
            external_id: Some(self.id.to_string()),
            name: self.name,
            sport_type,
            workout_type,
            start_date: self.start_date,
            distance_meters: self.distance.max(0.0),
            moving_seconds: self.moving_time,
            elapsed_seconds: self.elapsed_time.max(self.moving_time),
            elevation_gain: self.total_elevation_gain,
            average_heart_rate: self.average_heartrate.filter(|hr| *hr > 0.0),
            max_heart_rate: self.max_heartrate.filter(|hr| *hr > 0.0),
            perceived_effort: None,
            splits: self
                .splits_metric
                .into_iter()
                .map(|s| Split {
                    index: s.split,
                    distance_meters: s.distance,
                    elapsed_seconds: s.elapsed_time,
                    moving_seconds: s.moving_time,
                    average_heart_rate: s.average_heartrate,
                    elevation_difference: s.elevation_difference,
                })
                .collect(),
            best_efforts: self
                .best_efforts
                .into_iter()
                .map(|e| BestEffort {
                    name: e.name,
                    distance_meters: e.distance,
                    elapsed_seconds: e.elapsed_time,
                    start_date: e.start_date,
                    activity_id: None,
                })
                .collect(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
