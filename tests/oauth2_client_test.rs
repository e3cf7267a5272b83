// ABOUTME: Strava OAuth2 client tests against a mock token endpoint
// ABOUTME: Authorization URL shape, code exchange, refresh and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::collections::HashMap;

use dreamy::config::StravaConfig;
use dreamy::errors::ErrorCode;
use dreamy::oauth2_client::{OAuth2Client, OAuth2Config};
use helpers::fixtures::{test_config, token_response, ATHLETE_ID};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OAuth2Client {
    OAuth2Client::new(OAuth2Config::from_strava(&test_config(&server.uri()).strava))
}

#[test]
fn test_authorization_url_carries_flow_parameters() {
    let client = OAuth2Client::new(OAuth2Config::from_strava(
        &test_config("https://strava.test").strava,
    ));
    let url = Url::parse(&client.authorization_url("state-123").unwrap()).unwrap();

    assert_eq!(url.path(), "/oauth/authorize");
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "12345");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], "http://localhost:8081/strava/callback");
    assert_eq!(params["scope"], "read,activity:read_all");
    assert_eq!(params["state"], "state-123");
    assert_eq!(params["approval_prompt"], "auto");
}

#[test]
fn test_unconfigured_client_refuses_to_start_flow() {
    let client = OAuth2Client::new(OAuth2Config::from_strava(&StravaConfig::default()));
    assert!(!client.config().is_configured());
    assert_eq!(
        client.authorization_url("state").unwrap_err().code,
        ErrorCode::ConfigError
    );
}

#[tokio::test]
async fn test_exchange_code_returns_tokens_and_athlete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("client_secret=shh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(
            "access-a",
            "refresh-a",
            21_600,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server).exchange_code("auth-code").await.unwrap();
    assert_eq!(token.access_token, "access-a");
    assert_eq!(token.refresh_token, "refresh-a");
    assert_eq!(token.athlete.unwrap().id, ATHLETE_ID);
    assert!(token.expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn test_refresh_sends_refresh_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(
            "access-new",
            "refresh-new",
            21_600,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server).refresh("refresh-old").await.unwrap();
    assert_eq!(token.access_token, "access-new");
    assert_eq!(token.refresh_token, "refresh-new");
}

#[tokio::test]
async fn test_token_endpoint_errors_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=bad-code"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Bad Request",
            "errors": [{"resource": "AuthorizationCode", "field": "code", "code": "invalid"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "900"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=broken"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let rejected = client.exchange_code("bad-code").await.unwrap_err();
    assert_eq!(rejected.code, ErrorCode::ExternalAuthFailed);
    assert!(rejected.is_auth_failure());

    let limited = client.exchange_code("busy").await.unwrap_err();
    assert_eq!(limited.code, ErrorCode::ExternalRateLimited);
    assert!(limited.message.contains("900"));

    let broken = client.exchange_code("broken").await.unwrap_err();
    assert_eq!(broken.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_malformed_token_body_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let err = client_for(&server).refresh("whatever").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_deauthorize_posts_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .and(body_string_contains("access_token=access-z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).deauthorize("access-z").await.unwrap();
}
