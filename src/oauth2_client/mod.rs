// ABOUTME: OAuth 2.0 client for connecting athletes' Strava accounts
// ABOUTME: Authorization URL, code exchange, token refresh, deauthorization and CSRF state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! # OAuth 2.0 Client Module
//!
//! Dreamy acts as an OAuth 2.0 client of Strava using the authorization-code
//! flow. This module covers the HTTP side of that flow:
//! - building the authorization URL with a single-use CSRF state
//! - exchanging the returned code for a token pair
//! - refreshing an access token before it expires
//! - revoking access when the athlete disconnects

/// Strava OAuth 2.0 client
pub mod client;
/// CSRF state generation
pub mod state;

pub use client::{OAuth2Client, OAuth2Config, StravaAthleteSummary, StravaToken};
pub use state::generate_state;
