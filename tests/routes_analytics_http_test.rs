// ABOUTME: HTTP tests for the analytics routes
// ABOUTME: Empty-history responses, race-anchored fitness, series lengths and parameter validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use axum::Router;
use chrono::{Duration, Utc};
use dreamy::models::RaceInput;
use dreamy::resources::ServerResources;
use dreamy::server::router;
use helpers::axum_test::AxumTestRequest;
use helpers::fake_strava::FakeStravaApi;
use helpers::fixtures::{manual_run, test_resources, token_for};
use serde_json::Value;
use uuid::Uuid;

async fn setup() -> (Arc<ServerResources>, Router) {
    let resources = test_resources(Arc::new(FakeStravaApi::new())).await;
    let app = router(&resources);
    (resources, app)
}

/// A few weeks of easy running plus a 45 minute 10k race ten days ago
async fn seed_history(resources: &ServerResources, user_id: Uuid) {
    for days_ago in [2, 4, 6, 9, 13, 16, 20, 23] {
        resources
            .database
            .create_activity(&manual_run(user_id, days_ago, 8000.0, 2800))
            .await
            .unwrap();
    }
    let race = RaceInput {
        name: "Harbour 10k".to_owned(),
        distance_meters: 10_000.0,
        finish_seconds: 2700,
        race_date: (Utc::now() - Duration::days(10)).date_naive(),
        activity_id: None,
        notes: None,
    }
    .into_race(user_id);
    resources.database.create_race(&race).await.unwrap();
}

async fn get_json(app: &Router, uri: &str, token: &str) -> (u16, Value) {
    let response = AxumTestRequest::get(uri).bearer(token).send(app.clone()).await;
    (response.status(), response.json())
}

#[tokio::test]
async fn test_empty_history_is_not_an_error() {
    let (_, app) = setup().await;
    let token = token_for(Uuid::new_v4());

    let (status, dashboard) = get_json(&app, "/api/analytics/dashboard", &token).await;
    assert_eq!(status, 200);
    assert_eq!(dashboard["activity_count"], 0);
    assert!(dashboard["fitness"].is_null());
    assert_eq!(dashboard["weeks"].as_array().unwrap().len(), 4);

    let (status, fitness) = get_json(&app, "/api/analytics/fitness", &token).await;
    assert_eq!(status, 200);
    assert!(fitness["current"].is_null());

    let (status, threshold) = get_json(&app, "/api/analytics/threshold", &token).await;
    assert_eq!(status, 200);
    assert!(threshold["lthr"].is_null());

    let (status, records) = get_json(&app, "/api/analytics/records", &token).await;
    assert_eq!(status, 200);
    assert!(records["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_fitness_is_anchored_on_race() {
    let (resources, app) = setup().await;
    let user_id = Uuid::new_v4();
    seed_history(&resources, user_id).await;
    let token = token_for(user_id);

    let (status, fitness) = get_json(&app, "/api/analytics/fitness", &token).await;
    assert_eq!(status, 200);
    let vdot = fitness["current"]["vdot"].as_f64().unwrap();
    assert!((44.0..47.0).contains(&vdot), "vdot {vdot}");
    assert!(!fitness["training_paces"].is_null());
    assert!(!fitness["race_equivalents"].as_array().unwrap().is_empty());

    let (status, riegel) =
        get_json(&app, "/api/analytics/fitness?algorithm=riegel&bucket=week", &token).await;
    assert_eq!(status, 200);
    assert!(riegel["current"]["vdot"].as_f64().is_some());

    let (_, records) = get_json(&app, "/api/analytics/records", &token).await;
    let ten_k = records["records"]
        .as_array()
        .unwrap()
        .iter()
        .find(|record| record["distance"] == "k10")
        .expect("10k record");
    assert_eq!(ten_k["seconds"], 2700);
}

#[tokio::test]
async fn test_load_and_weekly_lengths() {
    let (resources, app) = setup().await;
    let user_id = Uuid::new_v4();
    seed_history(&resources, user_id).await;
    let token = token_for(user_id);

    let (status, load) = get_json(&app, "/api/analytics/load?days=30&algorithm=sma", &token).await;
    assert_eq!(status, 200);
    let series = load["series"].as_array().unwrap();
    assert_eq!(series.len(), 30);
    assert_eq!(
        series.last().unwrap()["date"],
        Utc::now().date_naive().to_string()
    );
    assert!(!load["summary"].is_null());

    let (status, weekly) = get_json(&app, "/api/analytics/weekly?weeks=6", &token).await;
    assert_eq!(status, 200);
    let weeks = weekly["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 6);
    let runs: u64 = weeks
        .iter()
        .map(|week| week["run_count"].as_u64().unwrap())
        .sum();
    assert_eq!(runs, 8);

    let (status, dashboard) = get_json(&app, "/api/analytics/dashboard", &token).await;
    assert_eq!(status, 200);
    assert_eq!(dashboard["activity_count"], 8);
    assert!(!dashboard["load"].is_null());
}

#[tokio::test]
async fn test_analytics_parameters_are_validated() {
    let (_, app) = setup().await;
    let token = token_for(Uuid::new_v4());

    for uri in [
        "/api/analytics/fitness?window_days=0",
        "/api/analytics/fitness?window_days=4000",
        "/api/analytics/fitness?algorithm=cooper",
        "/api/analytics/fitness?bucket=year",
        "/api/analytics/load?days=0",
        "/api/analytics/load?days=731",
        "/api/analytics/load?algorithm=magic",
        "/api/analytics/weekly?weeks=0",
        "/api/analytics/weekly?weeks=105",
        "/api/analytics/weekly?weeks=many",
    ] {
        let (status, body) = get_json(&app, uri, &token).await;
        assert_eq!(status, 400, "{uri}");
        assert_eq!(body["error"]["code"], "INVALID_INPUT", "{uri}");
    }

    let unauthenticated = AxumTestRequest::get("/api/analytics/dashboard")
        .send(app)
        .await;
    assert_eq!(unauthenticated.status(), 401);
}
