// ABOUTME: Strava activity import for a single user
// ABOUTME: Pages through new activities, fetches detail for new runs and upserts by external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use chrono::{Duration, Utc};
use dreamy_core::constants::sync::{MAX_PAGES, PAGE_SIZE};
use dreamy_core::errors::{AppError, AppResult, ErrorCode};
use dreamy_core::models::ActivitySource;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::token_manager::TokenManager;
use crate::config::SyncConfig;
use crate::database::{Database, UpsertOutcome};
use crate::providers::{StravaActivity, StravaApi};

/// Counts from one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Activities returned by Strava
    pub fetched: u32,
    /// Activities inserted
    pub created: u32,
    /// Activities refreshed in place
    pub updated: u32,
    /// Detail requests made
    pub detailed: u32,
    /// The page cap was hit; the next sync resumes after the newest stored activity
    pub more_available: bool,
}

/// Imports Strava activities into storage
pub struct SyncService {
    database: Database,
    tokens: Arc<TokenManager>,
    api: Arc<dyn StravaApi>,
    config: SyncConfig,
}

impl SyncService {
    /// Create a sync service
    #[must_use]
    pub fn new(
        database: Database,
        tokens: Arc<TokenManager>,
        api: Arc<dyn StravaApi>,
        config: SyncConfig,
    ) -> Self {
        Self {
            database,
            tokens,
            api,
            config,
        }
    }

    /// Import everything since the last sync, or the lookback window on a first sync
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` when the user has no connection
    /// - `PERMISSION_DENIED` when the granted scope cannot read activities
    /// - `AUTH_EXPIRED` when Strava access has been revoked
    /// - rate limit, service or database errors
    pub async fn sync_user(&self, user_id: Uuid) -> AppResult<SyncReport> {
        let connection = self
            .tokens
            .load_connection(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Strava connection"))?;
        if !connection.can_read_activities() {
            return Err(AppError::new(
                ErrorCode::PermissionDenied,
                "Strava authorization does not include activity:read",
            ));
        }

        let started = Utc::now();
        let after = connection.last_synced_at.unwrap_or_else(|| {
            started - Duration::days(i64::from(self.config.lookback_days))
        });
        let token = self.tokens.access_token(user_id).await?;

        let mut report = SyncReport::default();
        let mut detail_budget = self.config.detail_limit;
        let mut newest = after;
        let mut exhausted = false;

        for page in 1..=MAX_PAGES {
            let batch = self
                .api
                .list_activities(&token, Some(after), page, PAGE_SIZE)
                .await?;
            let page_len = batch.len();

            for summary in batch {
                report.fetched += 1;
                newest = newest.max(summary.start_date);
                let is_new = self
                    .database
                    .get_activity_by_external(user_id, ActivitySource::Strava, &summary.id.to_string())
                    .await?
                    .is_none();

                let detail = if is_new && summary.sport().is_running() && detail_budget > 0 {
                    detail_budget -= 1;
                    self.fetch_detail(&token, summary.id, &mut report).await?
                } else {
                    None
                };

                let outcome = self
                    .store(user_id, detail.unwrap_or(summary))
                    .await?;
                if outcome.created {
                    report.created += 1;
                } else {
                    report.updated += 1;
                }
            }

            if page_len < PAGE_SIZE as usize {
                exhausted = true;
                break;
            }
        }

        // Strava lists oldest first, so a truncated run can resume from the newest start
        let cursor = if exhausted {
            started
        } else {
            report.more_available = true;
            warn!(%user_id, pages = MAX_PAGES, %newest, "Strava sync hit the page cap");
            newest
        };
        self.database.touch_connection_sync(user_id, cursor).await?;
        info!(
            %user_id,
            fetched = report.fetched,
            created = report.created,
            updated = report.updated,
            detailed = report.detailed,
            more_available = report.more_available,
            "Strava sync complete"
        );
        Ok(report)
    }

    /// Import or refresh one activity, as announced by a webhook
    ///
    /// # Errors
    ///
    /// Returns token, API or database errors
    pub async fn sync_activity(&self, user_id: Uuid, external_id: i64) -> AppResult<UpsertOutcome> {
        let token = self.tokens.access_token(user_id).await?;
        let activity = self.api.get_activity(&token, external_id).await?;
        let outcome = self.store(user_id, activity).await?;
        info!(%user_id, external_id, created = outcome.created, "Synced Strava activity");
        Ok(outcome)
    }

    /// Fetch detail, tolerating per-activity failures other than auth
    async fn fetch_detail(
        &self,
        token: &str,
        id: i64,
        report: &mut SyncReport,
    ) -> AppResult<Option<StravaActivity>> {
        match self.api.get_activity(token, id).await {
            Ok(detail) => {
                report.detailed += 1;
                Ok(Some(detail))
            }
            Err(error) if error.is_auth_failure() || error.code == ErrorCode::ExternalRateLimited => {
                Err(error)
            }
            Err(error) => {
                warn!(activity_id = id, %error, "Strava detail fetch failed; storing summary only");
                Ok(None)
            }
        }
    }

    async fn store(&self, user_id: Uuid, activity: StravaActivity) -> AppResult<UpsertOutcome> {
        self.database
            .upsert_external_activity(&activity.into_activity(user_id))
            .await
    }
}
