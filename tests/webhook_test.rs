// ABOUTME: Strava webhook event processing against in-memory storage
// ABOUTME: Activity create/update/delete, athlete deauthorization and foreign subscriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use chrono::Duration;
use dreamy::config::SyncConfig;
use dreamy::crypto::TokenCipher;
use dreamy::database::Database;
use dreamy::models::ActivitySource;
use dreamy::oauth2_client::{OAuth2Client, OAuth2Config};
use dreamy::services::{SyncService, TokenManager};
use dreamy::webhooks::{WebhookAction, WebhookEvent, WebhookProcessor};
use helpers::fake_strava::{strava_run, with_detail, FakeStravaApi};
use helpers::fixtures::{connection, memory_database, test_config, ATHLETE_ID, SUBSCRIPTION_ID};
use serde_json::json;
use uuid::Uuid;

struct Harness {
    database: Database,
    tokens: Arc<TokenManager>,
    api: Arc<FakeStravaApi>,
    processor: WebhookProcessor,
    user_id: Uuid,
}

async fn harness() -> Harness {
    let database = memory_database().await;
    let tokens = Arc::new(TokenManager::new(
        database.clone(),
        Arc::new(TokenCipher::generate()),
        Arc::new(OAuth2Client::new(OAuth2Config::from_strava(
            &test_config("http://127.0.0.1:9").strava,
        ))),
    ));
    let api = Arc::new(FakeStravaApi::new());
    let sync = Arc::new(SyncService::new(
        database.clone(),
        tokens.clone(),
        api.clone(),
        SyncConfig {
            lookback_days: 30,
            detail_limit: 10,
        },
    ));
    let processor =
        WebhookProcessor::new(database.clone(), tokens.clone(), sync, Some(SUBSCRIPTION_ID));

    let user_id = Uuid::new_v4();
    tokens
        .store_connection(&connection(user_id, Duration::hours(6)))
        .await
        .unwrap();

    Harness {
        database,
        tokens,
        api,
        processor,
        user_id,
    }
}

fn event(object_type: &str, aspect_type: &str, object_id: i64) -> WebhookEvent {
    serde_json::from_value(json!({
        "object_type": object_type,
        "object_id": object_id,
        "aspect_type": aspect_type,
        "owner_id": ATHLETE_ID,
        "subscription_id": SUBSCRIPTION_ID,
        "event_time": 1_740_000_000
    }))
    .unwrap()
}

#[tokio::test]
async fn test_activity_create_then_update() {
    let h = harness().await;
    h.api.add_detail(with_detail(strava_run(31, 1, 10_000.0, 2950)));

    let created = h.processor.process(&event("activity", "create", 31)).await.unwrap();
    let WebhookAction::ActivitySynced {
        user_id,
        activity_id,
        created: true,
    } = created
    else {
        panic!("expected a new activity, got {created:?}");
    };
    assert_eq!(user_id, h.user_id);

    let updated = h.processor.process(&event("activity", "update", 31)).await.unwrap();
    assert_eq!(
        updated,
        WebhookAction::ActivitySynced {
            user_id: h.user_id,
            activity_id,
            created: false,
        }
    );

    let stored = h
        .database
        .get_activity(h.user_id, activity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.splits.len(), 10);
}

#[tokio::test]
async fn test_activity_delete_removes_row() {
    let h = harness().await;
    h.database
        .upsert_external_activity(&strava_run(32, 1, 5000.0, 1500).into_activity(h.user_id))
        .await
        .unwrap();

    let action = h.processor.process(&event("activity", "delete", 32)).await.unwrap();
    assert_eq!(
        action,
        WebhookAction::ActivityDeleted {
            user_id: h.user_id,
            deleted: true,
        }
    );
    assert!(h
        .database
        .get_activity_by_external(h.user_id, ActivitySource::Strava, "32")
        .await
        .unwrap()
        .is_none());

    let again = h.processor.process(&event("activity", "delete", 32)).await.unwrap();
    assert_eq!(
        again,
        WebhookAction::ActivityDeleted {
            user_id: h.user_id,
            deleted: false,
        }
    );
}

#[tokio::test]
async fn test_athlete_deauthorization_removes_connection() {
    let h = harness().await;
    let mut deauth = event("athlete", "update", ATHLETE_ID);
    deauth.updates.insert("authorized".to_owned(), json!("false"));

    let action = h.processor.process(&deauth).await.unwrap();
    assert_eq!(
        action,
        WebhookAction::ConnectionRevoked {
            user_id: h.user_id
        }
    );
    assert!(!h.tokens.status(h.user_id).await.unwrap().connected);

    let repeat = h.processor.process(&deauth).await.unwrap();
    assert!(matches!(repeat, WebhookAction::Ignored { .. }));
}

#[tokio::test]
async fn test_irrelevant_events_are_ignored() {
    let h = harness().await;

    let mut foreign = event("activity", "create", 33);
    foreign.subscription_id = SUBSCRIPTION_ID + 1;
    let mut stranger = event("activity", "create", 34);
    stranger.owner_id = ATHLETE_ID + 1;
    let athlete_update = event("athlete", "update", ATHLETE_ID);

    for event in [foreign, stranger, athlete_update] {
        let action = h.processor.process(&event).await.unwrap();
        assert!(matches!(action, WebhookAction::Ignored { .. }), "{action:?}");
    }
    assert!(h.api.detail_calls().is_empty());
    assert!(h.tokens.status(h.user_id).await.unwrap().connected);
}
