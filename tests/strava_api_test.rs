// ABOUTME: Strava REST client tests against a mock API
// ABOUTME: Request shape for listing and detail calls and status code mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use dreamy::errors::ErrorCode;
use dreamy::models::{SportType, WorkoutType};
use dreamy::providers::{StravaApi, StravaClient};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn summary_json(id: i64, sport: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Activity {id}"),
        "type": sport,
        "sport_type": sport,
        "start_date": "2025-04-01T06:00:00Z",
        "distance": 10_250.5,
        "moving_time": 3000,
        "elapsed_time": 3100,
        "total_elevation_gain": 45.0,
        "average_heartrate": 151.2,
        "max_heartrate": 177.0,
        "workout_type": 1
    })
}

async fn error_code(client: &StravaClient, id: i64) -> ErrorCode {
    client.get_activity("token", id).await.unwrap_err().code
}

#[tokio::test]
async fn test_list_activities_sends_paging_and_after() {
    let server = MockServer::start().await;
    let after = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(header("authorization", "Bearer access-1"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "50"))
        .and(query_param("after", after.timestamp().to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([summary_json(1, "Run"), summary_json(2, "Ride")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = StravaClient::new(format!("{}/api/v3/", server.uri()));
    let activities = client
        .list_activities("access-1", Some(after), 2, 50)
        .await
        .unwrap();

    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].sport(), SportType::Run);
    assert_eq!(activities[1].sport(), SportType::Ride);

    let user_id = Uuid::new_v4();
    let run = activities[0].clone().into_activity(user_id);
    assert_eq!(run.workout_type, WorkoutType::Race);
    assert_eq!(run.external_id.as_deref(), Some("1"));
    let ride = activities[1].clone().into_activity(user_id);
    assert_eq!(ride.workout_type, WorkoutType::Other);
}

#[tokio::test]
async fn test_get_activity_requests_all_efforts() {
    let server = MockServer::start().await;
    let mut detail = summary_json(42, "Run");
    detail["splits_metric"] = json!([
        {"split": 1, "distance": 1000.0, "elapsed_time": 290, "moving_time": 288, "average_heartrate": 150.0, "elevation_difference": 1.5}
    ]);
    detail["best_efforts"] = json!([
        {"name": "1k", "distance": 1000.0, "elapsed_time": 280, "start_date": "2025-04-01T06:10:00Z"}
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/42"))
        .and(query_param("include_all_efforts", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .expect(1)
        .mount(&server)
        .await;

    let client = StravaClient::new(format!("{}/api/v3", server.uri()));
    let activity = client.get_activity("access-1", 42).await.unwrap();
    assert_eq!(activity.splits_metric.len(), 1);
    assert_eq!(activity.best_efforts[0].name, "1k");
}

#[tokio::test]
async fn test_get_athlete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4242, "username": "runner", "firstname": "Ana", "lastname": "R", "sex": "F"
        })))
        .mount(&server)
        .await;

    let athlete = StravaClient::new(format!("{}/api/v3", server.uri()))
        .get_athlete("access-1")
        .await
        .unwrap();
    assert_eq!(athlete.id, 4242);
}

#[tokio::test]
async fn test_status_codes_map_to_error_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Authorization Error"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = StravaClient::new(format!("{}/api/v3", server.uri()));
    assert_eq!(error_code(&client, 1).await, ErrorCode::AuthExpired);
    assert_eq!(error_code(&client, 2).await, ErrorCode::ResourceNotFound);
    assert_eq!(error_code(&client, 3).await, ErrorCode::ExternalRateLimited);
    assert_eq!(error_code(&client, 4).await, ErrorCode::ExternalServiceError);
    assert_eq!(error_code(&client, 5).await, ErrorCode::ExternalServiceError);
}
