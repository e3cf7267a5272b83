// ABOUTME: External activity providers
// ABOUTME: Strava is the only provider; its API sits behind a trait so sync can be tested
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

/// Strava REST API client
pub mod strava;

pub use strava::{StravaActivity, StravaApi, StravaAthlete, StravaBestEffort, StravaClient, StravaSplit};
