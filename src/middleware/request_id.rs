// ABOUTME: Request correlation ids for every HTTP request
// ABOUTME: Accepts or generates x-request-id, echoes it and stamps it into JSON error bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id we accept
const MAX_REQUEST_ID_LEN: usize = 128;

/// Largest error body we rewrite
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Correlation id, available to handlers as `Extension<RequestId>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn incoming_id(request: &Request) -> Option<RequestId> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(|id| RequestId(id.to_owned()))
}

/// Attach a request id to the request, its span and its response
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(RequestId::generate);
    request.extensions_mut().insert(request_id.clone());

    let span = info_span!(
        "http_request",
        request_id = %request_id.as_str(),
        method = %request.method(),
        path = %request.uri().path(),
        user_id = tracing::field::Empty,
    );
    let response = next.run(request).instrument(span).await;

    let mut response = if response.status().is_client_error() || response.status().is_server_error()
    {
        stamp_error_body(response, &request_id).await
    } else {
        response
    };

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Fill `error.request_id` in JSON error envelopes that lack one
async fn stamp_error_body(response: Response, request_id: &RequestId) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(mut payload) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    let Some(error) = payload.get_mut("error").and_then(Value::as_object_mut) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    if error.get("request_id").is_some_and(|id| !id.is_null()) {
        return Response::from_parts(parts, Body::from(bytes));
    }
    error.insert(
        "request_id".to_owned(),
        Value::String(request_id.as_str().to_owned()),
    );

    match serde_json::to_vec(&payload) {
        Ok(rewritten) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(rewritten))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
