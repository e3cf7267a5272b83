// ABOUTME: Push notification receivers for connected providers
// ABOUTME: Strava subscription validation and event processing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

/// Strava webhook events
pub mod strava;

pub use strava::{
    verify_subscription, SubscriptionChallenge, WebhookAction, WebhookEvent, WebhookProcessor,
};
