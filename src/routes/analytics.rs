// ABOUTME: Analytics route handlers: fitness, load, threshold, records, weekly and dashboard
// ABOUTME: Query parameters select windows and algorithms, everything is computed per request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use dreamy_core::errors::{AppError, AppResult};
use dreamy_intelligence::{HistoryBucket, PersonalRecordBook, TrainingLoadAlgorithm, VdotAlgorithm};
use serde::Deserialize;

use super::{query_rejection, today};
use crate::middleware::AuthenticatedUser;
use crate::resources::ServerResources;
use crate::services::analytics::{
    Dashboard, FitnessReport, LoadReport, ThresholdReport, WeeklyReport,
};
use crate::services::LoadQuery;

/// Longest fitness window accepted
const MAX_WINDOW_DAYS: u32 = 3650;
/// Longest load series accepted
const MAX_SERIES_DAYS: u32 = 730;
/// Weekly summaries returned by default
const DEFAULT_WEEKS: u32 = 12;
/// Most weeks accepted
const MAX_WEEKS: u32 = 104;

fn check_range(field: &str, value: u32, max: u32) -> AppResult<u32> {
    if value == 0 || value > max {
        return Err(AppError::invalid_input(format!(
            "{field} must be between 1 and {max}"
        )));
    }
    Ok(value)
}

/// `GET /api/analytics/fitness` parameters
#[derive(Debug, Default, Deserialize)]
pub struct FitnessParams {
    /// Look-back window in days
    pub window_days: Option<u32>,
    /// `daniels` or `riegel`
    pub algorithm: Option<String>,
    /// `month` or `week`
    pub bucket: Option<HistoryBucket>,
}

/// `GET /api/analytics/load` parameters
#[derive(Debug, Default, Deserialize)]
pub struct LoadParams {
    /// Series length in days
    pub days: Option<u32>,
    /// `ema`, `impulse_response` or `sma`
    pub algorithm: Option<String>,
}

/// `GET /api/analytics/weekly` parameters
#[derive(Debug, Default, Deserialize)]
pub struct WeeklyParams {
    /// Number of weeks ending with the current one
    pub weeks: Option<u32>,
}

/// Analytics routes
pub struct AnalyticsRoutes;

impl AnalyticsRoutes {
    /// Everything under `/api/analytics`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analytics/fitness", get(Self::handle_fitness))
            .route("/api/analytics/load", get(Self::handle_load))
            .route("/api/analytics/threshold", get(Self::handle_threshold))
            .route("/api/analytics/records", get(Self::handle_records))
            .route("/api/analytics/weekly", get(Self::handle_weekly))
            .route("/api/analytics/dashboard", get(Self::handle_dashboard))
            .with_state(resources)
    }

    async fn handle_fitness(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        params: Result<Query<FitnessParams>, QueryRejection>,
    ) -> Result<Json<FitnessReport>, AppError> {
        let Query(params) = params.map_err(|e| query_rejection(&e))?;
        let mut query = resources.analytics.default_fitness_query();
        if let Some(days) = params.window_days {
            query.window_days = check_range("window_days", days, MAX_WINDOW_DAYS)?;
        }
        if let Some(algorithm) = params.algorithm.as_deref() {
            query.algorithm = algorithm.parse::<VdotAlgorithm>()?;
        }
        if let Some(bucket) = params.bucket {
            query.bucket = bucket;
        }
        let report = resources
            .analytics
            .fitness(auth.user_id, today(), query)
            .await?;
        Ok(Json(report))
    }

    async fn handle_load(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        params: Result<Query<LoadParams>, QueryRejection>,
    ) -> Result<Json<LoadReport>, AppError> {
        let Query(params) = params.map_err(|e| query_rejection(&e))?;
        let mut query = LoadQuery::default();
        if let Some(days) = params.days {
            query.days = check_range("days", days, MAX_SERIES_DAYS)?;
        }
        if let Some(algorithm) = params.algorithm.as_deref() {
            query.algorithm = algorithm.parse::<TrainingLoadAlgorithm>()?;
        }
        let report = resources
            .analytics
            .load_series(auth.user_id, today(), query)
            .await?;
        Ok(Json(report))
    }

    async fn handle_threshold(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<ThresholdReport>, AppError> {
        Ok(Json(resources.analytics.threshold(auth.user_id).await?))
    }

    async fn handle_records(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<PersonalRecordBook>, AppError> {
        Ok(Json(resources.analytics.records(auth.user_id).await?))
    }

    async fn handle_weekly(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        params: Result<Query<WeeklyParams>, QueryRejection>,
    ) -> Result<Json<WeeklyReport>, AppError> {
        let Query(params) = params.map_err(|e| query_rejection(&e))?;
        let weeks = check_range("weeks", params.weeks.unwrap_or(DEFAULT_WEEKS), MAX_WEEKS)?;
        let report = resources
            .analytics
            .weekly(auth.user_id, today(), weeks)
            .await?;
        Ok(Json(report))
    }

    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Json<Dashboard>, AppError> {
        Ok(Json(resources.analytics.dashboard(auth.user_id, today()).await?))
    }
}
