// ABOUTME: Core data models for the Dreamy running analytics service
// ABOUTME: Re-exports activities, races, profiles, Strava connections and sport enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! # Data Models
//!
//! Source-agnostic representations of what the athlete did. Manual entries and
//! Strava imports land in the same [`Activity`] shape so analytics never need
//! to know where a row came from.

mod activity;
mod profile;
mod race;
mod sport;
mod strava;

pub use activity::{Activity, ActivityInput, BestEffort, Split};
pub use profile::{AthleteProfile, ProfileUpdate, Sex};
pub use race::{RaceInput, RaceResult};
pub use sport::{ActivitySource, SportType, WorkoutType};
pub use strava::{scope_allows_activity_read, ConnectionStatus, StravaConnection};
