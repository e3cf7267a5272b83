// ABOUTME: Strava connection model holding the decrypted OAuth token pair
// ABOUTME: Debug output redacts tokens so they never reach the logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user's link to their Strava account
///
/// Tokens are plaintext only while in memory; storage holds ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct StravaConnection {
    /// Owner
    pub user_id: Uuid,
    /// Strava athlete id
    pub athlete_id: i64,
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// When the access token stops working
    pub expires_at: DateTime<Utc>,
    /// Granted scopes, comma separated
    pub scope: String,
    /// Last successful sync
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Set once Strava rejects the refresh token
    pub revoked_at: Option<DateTime<Utc>>,
}

impl StravaConnection {
    /// Whether the access token expires within `margin` of `now`
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at <= now + margin
    }

    /// Whether the connection has been revoked
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the granted scopes allow reading activities
    #[must_use]
    pub fn can_read_activities(&self) -> bool {
        scope_allows_activity_read(&self.scope)
    }

    /// Token-free view for API responses
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            connected: !self.is_revoked(),
            athlete_id: Some(self.athlete_id),
            scope: Some(self.scope.clone()),
            expires_at: Some(self.expires_at),
            last_synced_at: self.last_synced_at,
            revoked: self.is_revoked(),
        }
    }
}

impl fmt::Debug for StravaConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StravaConnection")
            .field("user_id", &self.user_id)
            .field("athlete_id", &self.athlete_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("last_synced_at", &self.last_synced_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// Connection state as reported to the athlete
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// Whether a usable connection exists
    pub connected: bool,
    /// Strava athlete id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub athlete_id: Option<i64>,
    /// Granted scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Access token expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Whether Strava revoked access
    pub revoked: bool,
}

impl ConnectionStatus {
    /// Status for a user without a connection
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            connected: false,
            athlete_id: None,
            scope: None,
            expires_at: None,
            last_synced_at: None,
            revoked: false,
        }
    }
}

/// Whether a granted scope string includes activity read access
#[must_use]
pub fn scope_allows_activity_read(scope: &str) -> bool {
    scope
        .split([',', ' '])
        .map(str::trim)
        .any(|s| s == "activity:read" || s == "activity:read_all")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_check() {
        assert!(scope_allows_activity_read("read,activity:read_all"));
        assert!(scope_allows_activity_read("activity:read"));
        assert!(!scope_allows_activity_read("read,profile:read_all"));
        assert!(!scope_allows_activity_read(""));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let connection = StravaConnection {
            user_id: Uuid::new_v4(),
            athlete_id: 42,
            access_token: "secret-access".into(),
            refresh_token: "secret-refresh".into(),
            expires_at: Utc::now(),
            scope: "activity:read".into(),
            last_synced_at: None,
            revoked_at: None,
        };
        let debug = format!("{connection:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(connection.needs_refresh(Utc::now(), Duration::minutes(5)));
    }
}
