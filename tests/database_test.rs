// ABOUTME: Storage tests against an in-memory SQLite database
// ABOUTME: Activities, external upserts, races, profiles, connections and OAuth states
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dreamy::database::{ActivityFilter, EncryptedConnection};
use dreamy::errors::ErrorCode;
use dreamy::models::{
    ActivitySource, BestEffort, ProfileUpdate, RaceInput, Sex, SportType, Split,
};
use helpers::fixtures::{manual_run_at, memory_database};
use uuid::Uuid;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

fn strava_copy(user_id: Uuid, external_id: &str, start: DateTime<Utc>) -> dreamy::models::Activity {
    let mut activity = manual_run_at(user_id, start, 10_000.0, 2900);
    activity.source = ActivitySource::Strava;
    activity.external_id = Some(external_id.to_owned());
    activity
}

#[tokio::test]
async fn test_activity_crud_is_scoped_to_owner() {
    let db = memory_database().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let mut activity = manual_run_at(owner, at(3, 7), 8000.0, 2600);
    activity.splits = vec![Split {
        index: 1,
        distance_meters: 1000.0,
        elapsed_seconds: 320,
        moving_seconds: 318,
        average_heart_rate: Some(148.0),
        elevation_difference: Some(2.0),
    }];
    db.create_activity(&activity).await.unwrap();

    let stored = db.get_activity(owner, activity.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Morning run");
    assert_eq!(stored.source, ActivitySource::Manual);
    assert_eq!(stored.splits, activity.splits);
    assert_eq!(stored.start_date, activity.start_date);
    assert!(db.get_activity(stranger, activity.id).await.unwrap().is_none());

    let mut edited = stored.clone();
    edited.name = "Tempo".to_owned();
    edited.perceived_effort = Some(7);
    assert!(db.update_activity(&edited).await.unwrap());
    let reloaded = db.get_activity(owner, activity.id).await.unwrap().unwrap();
    assert_eq!(reloaded.name, "Tempo");
    assert_eq!(reloaded.perceived_effort, Some(7));

    assert!(!db.delete_activity(stranger, activity.id).await.unwrap());
    assert!(db.delete_activity(owner, activity.id).await.unwrap());
    assert!(db.get_activity(owner, activity.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_activities_filters_and_orders() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();

    for day in [1, 5, 9, 13] {
        db.create_activity(&manual_run_at(user_id, at(day, 6), 5000.0, 1600))
            .await
            .unwrap();
    }
    let mut ride = manual_run_at(user_id, at(7, 6), 30_000.0, 3600);
    ride.sport_type = SportType::Ride;
    db.create_activity(&ride).await.unwrap();
    db.create_activity(&manual_run_at(Uuid::new_v4(), at(5, 6), 5000.0, 1600))
        .await
        .unwrap();

    let all = db
        .list_activities(user_id, &ActivityFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].start_date >= w[1].start_date));

    let runs = db
        .list_activities(
            user_id,
            &ActivityFilter {
                runs_only: true,
                ..ActivityFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(runs.len(), 4);

    let window = db
        .list_activities(
            user_id,
            &ActivityFilter {
                from: Some(at(5, 0)),
                to: Some(at(9, 23)),
                ..ActivityFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(window.len(), 3);

    let rides = db
        .list_activities(
            user_id,
            &ActivityFilter {
                sport: Some(SportType::Ride),
                ..ActivityFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rides.len(), 1);

    let newest = db
        .list_activities(
            user_id,
            &ActivityFilter {
                limit: Some(2),
                ..ActivityFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(newest.len(), 2);
    assert_eq!(newest[0].start_date, at(13, 6));
}

#[tokio::test]
async fn test_external_upsert_keeps_identity_and_detail() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();

    let mut detailed = strava_copy(user_id, "9001", at(10, 8));
    detailed.best_efforts = vec![BestEffort {
        name: "5k".to_owned(),
        distance_meters: 5000.0,
        elapsed_seconds: 1400,
        start_date: at(10, 8),
        activity_id: None,
    }];
    let first = db.upsert_external_activity(&detailed).await.unwrap();
    assert!(first.created);

    let mut summary = strava_copy(user_id, "9001", at(10, 8));
    summary.name = "Renamed on Strava".to_owned();
    let second = db.upsert_external_activity(&summary).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.id, first.id);

    let stored = db.get_activity(user_id, first.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed on Strava");
    assert_eq!(stored.best_efforts.len(), 1);

    let found = db
        .get_activity_by_external(user_id, ActivitySource::Strava, "9001")
        .await
        .unwrap();
    assert_eq!(found.map(|a| a.id), Some(first.id));

    let mut manual = manual_run_at(user_id, at(11, 8), 5000.0, 1500);
    manual.external_id = None;
    manual.source = ActivitySource::Strava;
    assert_eq!(
        db.upsert_external_activity(&manual).await.unwrap_err().code,
        ErrorCode::InvalidInput
    );

    assert!(db
        .delete_external_activity(user_id, ActivitySource::Strava, "9001")
        .await
        .unwrap());
    assert!(!db
        .delete_external_activity(user_id, ActivitySource::Strava, "9001")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_duplicate_external_insert_conflicts() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();
    db.create_activity(&strava_copy(user_id, "77", at(2, 9)))
        .await
        .unwrap();
    let err = db
        .create_activity(&strava_copy(user_id, "77", at(2, 9)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_races_link_to_activities() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();
    let activity = manual_run_at(user_id, at(16, 9), 10_000.0, 2500);
    db.create_activity(&activity).await.unwrap();

    let linked = RaceInput {
        name: "Spring 10K".to_owned(),
        distance_meters: 10_000.0,
        finish_seconds: 2490,
        race_date: NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
        activity_id: Some(activity.id),
        notes: None,
    }
    .into_race(user_id);
    let older = RaceInput {
        name: "Winter 5K".to_owned(),
        distance_meters: 5000.0,
        finish_seconds: 1210,
        race_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
        activity_id: None,
        notes: Some("icy".to_owned()),
    }
    .into_race(user_id);
    db.create_race(&older).await.unwrap();
    db.create_race(&linked).await.unwrap();

    let races = db.list_races(user_id).await.unwrap();
    assert_eq!(races.len(), 2);
    assert_eq!(races[0].name, "Spring 10K");
    assert_eq!(races[1].notes.as_deref(), Some("icy"));

    db.delete_activity(user_id, activity.id).await.unwrap();
    let unlinked = db.get_race(user_id, linked.id).await.unwrap().unwrap();
    assert!(unlinked.activity_id.is_none());

    assert!(db.delete_race(user_id, older.id).await.unwrap());
    assert!(!db.delete_race(user_id, older.id).await.unwrap());
    assert!(db.list_races(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_defaults_and_updates() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();

    assert!(db.get_profile(user_id).await.unwrap().is_none());
    let mut profile = db.get_profile_or_default(user_id).await.unwrap();
    assert!(profile.max_heart_rate.is_none());

    profile
        .apply(ProfileUpdate {
            sex: Some(Sex::Female),
            max_heart_rate: Some(188.0),
            threshold_pace_seconds_per_km: Some(255.0),
            ..ProfileUpdate::default()
        })
        .unwrap();
    db.upsert_profile(&profile).await.unwrap();

    let stored = db.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(stored.sex, Some(Sex::Female));
    assert_eq!(stored.max_heart_rate, Some(188.0));
    assert_eq!(stored.threshold_pace_seconds_per_km, Some(255.0));
}

fn encrypted(user_id: Uuid, athlete_id: i64) -> EncryptedConnection {
    EncryptedConnection {
        user_id,
        athlete_id,
        access_token_encrypted: "v1:access".to_owned(),
        refresh_token_encrypted: "v1:refresh".to_owned(),
        expires_at: at(20, 12),
        scope: "read,activity:read".to_owned(),
        last_synced_at: None,
        revoked_at: None,
    }
}

#[tokio::test]
async fn test_connection_lifecycle() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();
    db.upsert_connection(&encrypted(user_id, 55)).await.unwrap();

    db.update_connection_tokens(user_id, "v1:access-2", "v1:refresh-2", at(21, 12))
        .await
        .unwrap();
    db.touch_connection_sync(user_id, at(20, 13)).await.unwrap();
    db.mark_connection_revoked(user_id, at(20, 14)).await.unwrap();

    let row = db.get_connection_by_athlete(55).await.unwrap().unwrap();
    assert_eq!(row.user_id, user_id);
    assert_eq!(row.access_token_encrypted, "v1:access-2");
    assert_eq!(row.expires_at, at(21, 12));
    assert_eq!(row.last_synced_at, Some(at(20, 13)));
    assert_eq!(row.revoked_at, Some(at(20, 14)));

    // Reconnecting clears the revocation
    db.upsert_connection(&encrypted(user_id, 55)).await.unwrap();
    let row = db.get_connection(user_id).await.unwrap().unwrap();
    assert!(row.revoked_at.is_none());

    assert!(db.delete_connection(user_id).await.unwrap());
    assert!(db.get_connection(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_athlete_moves_to_newest_user() {
    let db = memory_database().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    db.upsert_connection(&encrypted(first, 99)).await.unwrap();
    db.upsert_connection(&encrypted(second, 99)).await.unwrap();

    assert!(db.get_connection(first).await.unwrap().is_none());
    let row = db.get_connection_by_athlete(99).await.unwrap().unwrap();
    assert_eq!(row.user_id, second);
}

#[tokio::test]
async fn test_oauth_state_is_single_use_and_expires() {
    let db = memory_database().await;
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    db.store_oauth_state("fresh", user_id, now + Duration::minutes(10))
        .await
        .unwrap();
    db.store_oauth_state("stale", user_id, now - Duration::minutes(1))
        .await
        .unwrap();
    db.store_oauth_state("old", user_id, now - Duration::hours(2))
        .await
        .unwrap();

    assert_eq!(
        db.consume_oauth_state("fresh", now).await.unwrap(),
        Some(user_id)
    );
    assert!(db.consume_oauth_state("fresh", now).await.unwrap().is_none());
    assert!(db.consume_oauth_state("stale", now).await.unwrap().is_none());
    assert!(db.consume_oauth_state("unknown", now).await.unwrap().is_none());

    assert_eq!(db.purge_expired_oauth_states(now).await.unwrap(), 1);
}

#[tokio::test]
async fn test_ping() {
    memory_database().await.ping().await.unwrap();
}
