// ABOUTME: Strava OAuth2 client for the authorization-code flow
// ABOUTME: Maps token endpoint failures onto auth, rate-limit and service errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::fmt;

use chrono::{DateTime, Utc};
use dreamy_core::constants::oauth::STRAVA;
use dreamy_core::errors::{AppError, AppResult};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::StravaConfig;
use crate::utils::http_client::oauth_client;

/// OAuth 2.0 client configuration
#[derive(Clone)]
pub struct OAuth2Config {
    /// OAuth client ID from Strava
    pub client_id: String,
    /// OAuth client secret from Strava
    pub client_secret: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Deauthorization endpoint URL
    pub deauthorize_url: String,
    /// Redirect URI registered with Strava
    pub redirect_uri: String,
    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Build the client configuration from the Strava settings
    ///
    /// Missing credentials become empty strings; [`Self::is_configured`]
    /// reports whether the flow can run.
    #[must_use]
    pub fn from_strava(strava: &StravaConfig) -> Self {
        Self {
            client_id: strava.client_id.clone().unwrap_or_default(),
            client_secret: strava.client_secret.clone().unwrap_or_default(),
            auth_url: strava.auth_url.clone(),
            token_url: strava.token_url.clone(),
            deauthorize_url: strava.deauthorize_url.clone(),
            redirect_uri: strava.redirect_uri.clone(),
            scopes: strava.scopes.clone(),
        }
    }

    /// Whether client credentials are present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("deauthorize_url", &self.deauthorize_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Summary information about the authorizing athlete
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StravaAthleteSummary {
    /// Strava athlete ID
    pub id: i64,
    /// Athlete's username
    #[serde(default)]
    pub username: Option<String>,
    /// Athlete's first name
    #[serde(default)]
    pub firstname: Option<String>,
    /// Athlete's last name
    #[serde(default)]
    pub lastname: Option<String>,
}

/// Token pair returned by Strava
#[derive(Clone)]
pub struct StravaToken {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token used to obtain the next pair
    pub refresh_token: String,
    /// When the access token stops working
    pub expires_at: DateTime<Utc>,
    /// Athlete summary, present on the initial exchange
    pub athlete: Option<StravaAthleteSummary>,
}

impl fmt::Debug for StravaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StravaToken")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("athlete", &self.athlete)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    /// Unix timestamp
    expires_at: i64,
    #[serde(default)]
    athlete: Option<StravaAthleteSummary>,
}

impl TokenResponse {
    fn into_token(self) -> AppResult<StravaToken> {
        let expires_at = DateTime::from_timestamp(self.expires_at, 0).ok_or_else(|| {
            AppError::external_service(STRAVA, format!("Invalid expires_at {}", self.expires_at))
        })?;
        Ok(StravaToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            athlete: self.athlete,
        })
    }
}

/// OAuth 2.0 client for Strava
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new client with the given configuration
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: oauth_client(),
        }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AppError::config(
                "Strava OAuth is not configured (STRAVA_CLIENT_ID / STRAVA_CLIENT_SECRET)",
            ))
        }
    }

    /// Get the authorization URL the athlete is redirected to
    ///
    /// # Errors
    ///
    /// Returns a config error if credentials are missing or the
    /// authorization URL is malformed
    pub fn authorization_url(&self, state: &str) -> AppResult<String> {
        self.ensure_configured()?;
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AppError::config(format!("Invalid Strava auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "auto")
            .append_pair("scope", &self.config.scopes.join(","))
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens and athlete info
    ///
    /// # Errors
    ///
    /// Returns an external auth error when Strava rejects the code, a rate
    /// limit error on 429, or a service error for other failures
    pub async fn exchange_code(&self, code: &str) -> AppResult<StravaToken> {
        self.ensure_configured()?;
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];
        debug!("Exchanging Strava authorization code");
        self.token_request(&params).await
    }

    /// Refresh an access token
    ///
    /// # Errors
    ///
    /// Returns an external auth error when the refresh token is rejected,
    /// a rate limit error on 429, or a service error for other failures
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<StravaToken> {
        self.ensure_configured()?;
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        debug!("Refreshing Strava access token");
        self.token_request(&params).await
    }

    /// Revoke the application's access for the token's athlete
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Strava rejects it
    pub async fn deauthorize(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .client
            .post(&self.config.deauthorize_url)
            .form(&[("access_token", access_token)])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> AppResult<StravaToken> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: TokenResponse = response.json().await.map_err(|e| {
            AppError::external_service(STRAVA, format!("Invalid token response: {e}"))
        })?;
        body.into_token()
    }
}

/// Map a non-success token endpoint response onto an `AppError`
async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Strava OAuth request failed");

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            AppError::external_auth_failed(STRAVA, format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => AppError::external_rate_limited(STRAVA, retry_after),
        _ => AppError::external_service(STRAVA, format!("{status}: {body}")),
    })
}
