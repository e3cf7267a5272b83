// ABOUTME: HTTP tests for the Strava connection routes
// ABOUTME: Full connect/callback/sync/disconnect cycle against a mock token endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use dreamy::config::ServerConfig;
use dreamy::server::router;
use helpers::axum_test::AxumTestRequest;
use helpers::fake_strava::{strava_run, FakeStravaApi};
use helpers::fixtures::{test_config, test_resources_with, token_for, token_response, ATHLETE_ID};
use serde_json::Value;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app_with(server: &MockServer, api: Arc<FakeStravaApi>) -> Router {
    let resources = test_resources_with(test_config(&server.uri()), api).await;
    router(&resources)
}

/// Start the flow and return the issued state
async fn begin(app: &Router, token: &str) -> String {
    let response = AxumTestRequest::get("/api/strava/connect")
        .bearer(token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    let url = Url::parse(body["authorization_url"].as_str().unwrap()).unwrap();
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    params["state"].clone()
}

async fn mount_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("access-1", "refresh-1", 21_600)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_sync_disconnect_cycle() {
    let server = MockServer::start().await;
    mount_exchange(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let api = Arc::new(FakeStravaApi::new());
    api.add_summary(strava_run(101, 2, 10_000.0, 3000));
    let app = app_with(&server, api.clone()).await;
    let token = token_for(Uuid::new_v4());

    let state = begin(&app, &token).await;
    let callback = AxumTestRequest::get(&format!(
        "/strava/callback?state={state}&code=auth-code&scope=read,activity:read_all"
    ))
    .send(app.clone())
    .await;
    assert_eq!(callback.status(), 200, "{}", callback.text());
    let status: Value = callback.json();
    assert_eq!(status["connected"], true);
    assert_eq!(status["athlete_id"], ATHLETE_ID);
    assert!(!callback.text().contains("access-1"));

    let replay = AxumTestRequest::get(&format!(
        "/strava/callback?state={state}&code=auth-code&scope=read,activity:read_all"
    ))
    .send(app.clone())
    .await;
    assert_eq!(replay.status(), 401);
    assert_eq!(replay.error_code(), "AUTH_INVALID");

    let sync = AxumTestRequest::post("/api/strava/sync")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(sync.status(), 200, "{}", sync.text());
    let report: Value = sync.json();
    assert_eq!(report["created"], 1);
    assert_eq!(api.tokens_seen()[0], "access-1");

    let status = AxumTestRequest::get("/api/strava/status")
        .bearer(&token)
        .send(app.clone())
        .await;
    let status: Value = status.json();
    assert_eq!(status["connected"], true);
    assert!(!status["last_synced_at"].is_null());

    let disconnect = AxumTestRequest::delete("/api/strava/connection")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(disconnect.status(), 200);
    assert_eq!(disconnect.json::<Value>()["disconnected"], true);

    let after = AxumTestRequest::get("/api/strava/status")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(after.json::<Value>()["connected"], false);
}

#[tokio::test]
async fn test_callback_rejections() {
    let server = MockServer::start().await;
    mount_exchange(&server).await;
    let app = app_with(&server, Arc::new(FakeStravaApi::new())).await;
    let token = token_for(Uuid::new_v4());

    let no_state = AxumTestRequest::get("/strava/callback?code=abc")
        .send(app.clone())
        .await;
    assert_eq!(no_state.status(), 401);

    let forged = AxumTestRequest::get("/strava/callback?state=forged&code=abc&scope=activity:read")
        .send(app.clone())
        .await;
    assert_eq!(forged.status(), 401);

    let state = begin(&app, &token).await;
    let denied = AxumTestRequest::get(&format!("/strava/callback?state={state}&error=access_denied"))
        .send(app.clone())
        .await;
    assert_eq!(denied.status(), 403);
    assert_eq!(denied.error_code(), "PERMISSION_DENIED");

    let state = begin(&app, &token).await;
    let narrow = AxumTestRequest::get(&format!("/strava/callback?state={state}&code=abc&scope=read"))
        .send(app.clone())
        .await;
    assert_eq!(narrow.status(), 403);

    let state = begin(&app, &token).await;
    let no_code = AxumTestRequest::get(&format!(
        "/strava/callback?state={state}&scope=activity:read"
    ))
    .send(app)
    .await;
    assert_eq!(no_code.status(), 400);
    assert_eq!(no_code.error_code(), "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_sync_and_status_without_connection() {
    let server = MockServer::start().await;
    let app = app_with(&server, Arc::new(FakeStravaApi::new())).await;
    let token = token_for(Uuid::new_v4());

    let status = AxumTestRequest::get("/api/strava/status")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(status.status(), 200);
    assert_eq!(status.json::<Value>()["connected"], false);

    let sync = AxumTestRequest::post("/api/strava/sync")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(sync.status(), 404);

    let disconnect = AxumTestRequest::delete("/api/strava/connection")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(disconnect.json::<Value>()["disconnected"], false);
}

#[tokio::test]
async fn test_connect_requires_configuration() {
    let resources = test_resources_with(ServerConfig::default(), Arc::new(FakeStravaApi::new())).await;
    let app = router(&resources);

    let response = AxumTestRequest::get("/api/strava/connect")
        .bearer(&token_for(Uuid::new_v4()))
        .send(app)
        .await;
    assert_eq!(response.status(), 500);
    assert_eq!(response.error_code(), "CONFIG_ERROR");
}
