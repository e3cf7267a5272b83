// ABOUTME: HTTP route groups for the JSON API
// ABOUTME: Assembles health, profile, activity, race, analytics, Strava and webhook routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! # Routes
//!
//! Every group takes the shared `Arc<ServerResources>` as router state.
//! Everything under `/api` authenticates through [`AuthenticatedUser`].
//!
//! [`AuthenticatedUser`]: crate::middleware::AuthenticatedUser

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::Router;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dreamy_core::errors::{AppError, AppResult};

use crate::resources::ServerResources;

/// Activity CRUD
pub mod activities;
/// Training analytics
pub mod analytics;
/// Liveness and readiness
pub mod health;
/// Athlete profile
pub mod profile;
/// Race results
pub mod races;
/// Strava connection management
pub mod strava;
/// Strava push events
pub mod webhooks;

pub use activities::ActivityRoutes;
pub use analytics::AnalyticsRoutes;
pub use health::HealthRoutes;
pub use profile::ProfileRoutes;
pub use races::RaceRoutes;
pub use strava::StravaRoutes;
pub use webhooks::WebhookRoutes;

/// All route groups merged
pub fn api_routes(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(ProfileRoutes::routes(Arc::clone(resources)))
        .merge(ActivityRoutes::routes(Arc::clone(resources)))
        .merge(RaceRoutes::routes(Arc::clone(resources)))
        .merge(AnalyticsRoutes::routes(Arc::clone(resources)))
        .merge(StravaRoutes::routes(Arc::clone(resources)))
        .merge(WebhookRoutes::routes(Arc::clone(resources)))
}

/// Map a body rejection into the error envelope
pub(crate) fn json_rejection(rejection: &JsonRejection) -> AppError {
    AppError::invalid_input(rejection.body_text())
}

/// Map a query-string rejection into the error envelope
pub(crate) fn query_rejection(rejection: &QueryRejection) -> AppError {
    AppError::invalid_input(rejection.body_text())
}

/// Map a path rejection into the error envelope
pub(crate) fn path_rejection(rejection: &PathRejection) -> AppError {
    AppError::invalid_input(rejection.body_text())
}

/// Parse `YYYY-MM-DD` or RFC 3339 into an instant
///
/// A bare date means midnight UTC, or the last instant of that day when
/// `end_of_day` is set.
pub(crate) fn parse_date_bound(
    field: &str,
    value: &str,
    end_of_day: bool,
) -> AppResult<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::invalid_input(format!("{field} must be YYYY-MM-DD or an RFC 3339 timestamp"))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        Some(NaiveTime::MIN)
    }
    .ok_or_else(|| AppError::internal("invalid time of day"))?;
    Ok(date.and_time(time).and_utc())
}

/// Today's date in UTC
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
