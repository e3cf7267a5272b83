// ABOUTME: HTTP client construction with per-purpose timeouts
// ABOUTME: Separate profiles for OAuth token calls and Strava API calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

const USER_AGENT: &str = concat!("dreamy/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given request and connect timeouts
///
/// Falls back to a default client if the builder rejects the settings.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for token exchanges, which should be fast
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(15, 5)
}

/// Client for Strava API reads
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(60, 10)
}
