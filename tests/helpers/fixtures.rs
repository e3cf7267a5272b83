// ABOUTME: Test fixtures: in-memory resources, tokens, activities and connections
// ABOUTME: Everything runs against sqlite::memory: with a throwaway encryption key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dreamy::auth::AuthManager;
use dreamy::config::{ServerConfig, StravaConfig};
use dreamy::crypto::TokenCipher;
use dreamy::database::Database;
use dreamy::models::{
    Activity, ActivityInput, ActivitySource, SportType, Split, StravaConnection, WorkoutType,
};
use dreamy::providers::StravaApi;
use dreamy::resources::ServerResources;
use serde_json::json;
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"integration-test-secret";
pub const VERIFY_TOKEN: &str = "verify-me";
pub const SUBSCRIPTION_ID: i64 = 777;
pub const ATHLETE_ID: i64 = 4242;

pub async fn memory_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Configuration pointing every Strava URL at `strava_base`
pub fn test_config(strava_base: &str) -> ServerConfig {
    ServerConfig {
        strava: StravaConfig {
            client_id: Some("12345".to_owned()),
            client_secret: Some("shh".to_owned()),
            redirect_uri: "http://localhost:8081/strava/callback".to_owned(),
            webhook_verify_token: Some(VERIFY_TOKEN.to_owned()),
            subscription_id: Some(SUBSCRIPTION_ID),
            api_base: format!("{strava_base}/api/v3"),
            auth_url: format!("{strava_base}/oauth/authorize"),
            token_url: format!("{strava_base}/oauth/token"),
            deauthorize_url: format!("{strava_base}/oauth/deauthorize"),
            scopes: vec!["read".to_owned(), "activity:read_all".to_owned()],
        },
        ..ServerConfig::default()
    }
}

pub async fn test_resources_with(
    config: ServerConfig,
    api: Arc<dyn StravaApi>,
) -> Arc<ServerResources> {
    Arc::new(ServerResources::with_components(
        config,
        memory_database().await,
        TokenCipher::generate(),
        AuthManager::new(JWT_SECRET, 1),
        api,
    ))
}

/// Resources whose Strava endpoints are unreachable; fine for routes that never call out
pub async fn test_resources(api: Arc<dyn StravaApi>) -> Arc<ServerResources> {
    test_resources_with(test_config("http://127.0.0.1:9"), api).await
}

pub fn token_for(user_id: Uuid) -> String {
    AuthManager::new(JWT_SECRET, 1)
        .issue_token(user_id)
        .expect("token")
}

/// A manual run `days_ago` days before now
pub fn manual_run(user_id: Uuid, days_ago: i64, meters: f64, seconds: u32) -> Activity {
    manual_run_at(user_id, Utc::now() - Duration::days(days_ago), meters, seconds)
}

pub fn manual_run_at(
    user_id: Uuid,
    start: DateTime<Utc>,
    meters: f64,
    seconds: u32,
) -> Activity {
    ActivityInput {
        name: "Morning run".to_owned(),
        sport_type: SportType::Run,
        workout_type: WorkoutType::Easy,
        start_date: start,
        distance_meters: meters,
        moving_seconds: seconds,
        elapsed_seconds: None,
        elevation_gain: None,
        average_heart_rate: Some(150.0),
        max_heart_rate: Some(170.0),
        perceived_effort: None,
        splits: Vec::new(),
        notes: None,
    }
    .into_activity(user_id, ActivitySource::Manual, None)
}

/// Twelve 1 km splits speeding up from 5:00 to 4:05 per km with HR rising linearly in speed
pub fn progressive_splits() -> Vec<Split> {
    (0..12_u32)
        .map(|i| {
            let seconds = 300 - 5 * i;
            let speed = 1000.0 / f64::from(seconds);
            Split {
                index: i + 1,
                distance_meters: 1000.0,
                elapsed_seconds: seconds,
                moving_seconds: seconds,
                average_heart_rate: Some(15.0f64.mul_add(speed, 100.0)),
                elevation_difference: Some(0.0),
            }
        })
        .collect()
}

/// Plaintext connection expiring in `expires_in`
pub fn connection(user_id: Uuid, expires_in: Duration) -> StravaConnection {
    StravaConnection {
        user_id,
        athlete_id: ATHLETE_ID,
        access_token: "access-1".to_owned(),
        refresh_token: "refresh-1".to_owned(),
        expires_at: Utc::now() + expires_in,
        scope: "read,activity:read_all".to_owned(),
        last_synced_at: None,
        revoked_at: None,
    }
}

/// Body of a Strava token endpoint response
pub fn token_response(access: &str, refresh: &str, expires_in_secs: i64) -> serde_json::Value {
    json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": (Utc::now() + Duration::seconds(expires_in_secs)).timestamp(),
        "expires_in": expires_in_secs,
        "athlete": { "id": ATHLETE_ID, "username": "runner", "firstname": "Ana", "lastname": "R" }
    })
}
