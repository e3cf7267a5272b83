// ABOUTME: Integration tests for the request id middleware
// ABOUTME: Generation, propagation of client ids, handler access and error body stamping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{middleware, routing::get, Extension, Json, Router};
use dreamy::errors::AppError;
use dreamy::middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
use dreamy::server::router;
use helpers::axum_test::AxumTestRequest;
use helpers::fake_strava::FakeStravaApi;
use helpers::fixtures::test_resources;
use serde_json::{json, Value};
use uuid::Uuid;

async fn echo_handler(Extension(request_id): Extension<RequestId>) -> String {
    format!("Request ID: {}", request_id.as_str())
}

async fn failing_handler() -> Result<String, AppError> {
    Err(AppError::invalid_input("always wrong"))
}

async fn teapot_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::IM_A_TEAPOT, Json(json!({"note": "not an envelope"})))
}

fn app() -> Router {
    Router::new()
        .route("/", get(echo_handler))
        .route("/fail", get(failing_handler))
        .route("/teapot", get(teapot_handler))
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn test_generates_uuid_when_absent() {
    let response = AxumTestRequest::get("/").send(app()).await;
    assert_eq!(response.status(), 200);

    let id = response.header(REQUEST_ID_HEADER).expect("request id header");
    assert!(Uuid::parse_str(id).is_ok());
    assert_eq!(response.text(), format!("Request ID: {id}"));
}

#[tokio::test]
async fn test_client_id_is_propagated() {
    let response = AxumTestRequest::get("/")
        .header(REQUEST_ID_HEADER, "client-trace-42")
        .send(app())
        .await;
    assert_eq!(response.header(REQUEST_ID_HEADER), Some("client-trace-42"));
    assert_eq!(response.text(), "Request ID: client-trace-42");
}

#[tokio::test]
async fn test_oversized_client_id_is_replaced() {
    let response = AxumTestRequest::get("/")
        .header(REQUEST_ID_HEADER, &"x".repeat(200))
        .send(app())
        .await;
    let id = response.header(REQUEST_ID_HEADER).unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_error_envelope_carries_request_id() {
    let response = AxumTestRequest::get("/fail")
        .header(REQUEST_ID_HEADER, "trace-fail")
        .send(app())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert_eq!(body["error"]["message"], "always wrong");
    assert_eq!(body["error"]["request_id"], "trace-fail");
}

#[tokio::test]
async fn test_non_envelope_errors_pass_through() {
    let response = AxumTestRequest::get("/teapot").send(app()).await;
    assert_eq!(response.status(), 418);
    assert_eq!(response.json::<Value>(), json!({"note": "not an envelope"}));
    assert!(response.header(REQUEST_ID_HEADER).is_some());
}

#[tokio::test]
async fn test_full_router_stamps_ids_and_serves_health() {
    let resources = test_resources(Arc::new(FakeStravaApi::new())).await;
    let app = router(&resources);

    let health = AxumTestRequest::get("/health").send(app.clone()).await;
    assert_eq!(health.status(), 200);
    let body: Value = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "dreamy");
    assert!(health.header(REQUEST_ID_HEADER).is_some());

    let ready = AxumTestRequest::get("/ready").send(app.clone()).await;
    assert_eq!(ready.status(), 200);
    assert_eq!(ready.json::<Value>()["database"], "ok");

    let missing = AxumTestRequest::get("/api/activities/00000000-0000-0000-0000-000000000000")
        .header(REQUEST_ID_HEADER, "trace-401")
        .send(app)
        .await;
    assert_eq!(missing.status(), 401);
    assert_eq!(missing.json::<Value>()["error"]["request_id"], "trace-401");
}
