// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads every setting from environment variables with development defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Environment-based configuration
//!
//! There are no configuration files. `ServerConfig::from_env` reads the
//! process environment, falls back to development defaults, and refuses to
//! build a production configuration that is missing a secret.

use std::env;
use std::fmt;
use std::str::FromStr;

use dreamy_core::constants::{fitness, network, oauth, sync};
use dreamy_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Strava OAuth, API and webhook settings
#[derive(Clone)]
pub struct StravaConfig {
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Callback URL registered with Strava
    pub redirect_uri: String,
    /// Token echoed during webhook subscription validation
    pub webhook_verify_token: Option<String>,
    /// Expected subscription id on webhook events
    pub subscription_id: Option<i64>,
    /// API base URL
    pub api_base: String,
    /// Authorization URL
    pub auth_url: String,
    /// Token URL
    pub token_url: String,
    /// Deauthorization URL
    pub deauthorize_url: String,
    /// Requested scopes
    pub scopes: Vec<String>,
}

impl StravaConfig {
    /// Whether OAuth credentials are present
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: format!(
                "http://{}:{}/strava/callback",
                network::DEFAULT_HOST,
                network::DEFAULT_HTTP_PORT
            ),
            webhook_verify_token: None,
            subscription_id: None,
            api_base: oauth::STRAVA_API_BASE.to_owned(),
            auth_url: oauth::STRAVA_AUTH_URL.to_owned(),
            token_url: oauth::STRAVA_TOKEN_URL.to_owned(),
            deauthorize_url: oauth::STRAVA_DEAUTH_URL.to_owned(),
            scopes: parse_scopes(oauth::STRAVA_SCOPES),
        }
    }
}

impl fmt::Debug for StravaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StravaConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field(
                "webhook_verify_token",
                &self.webhook_verify_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("subscription_id", &self.subscription_id)
            .field("api_base", &self.api_base)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Strava sync behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Days of history fetched when a user has never synced
    pub lookback_days: u32,
    /// Detail requests (splits, best efforts) allowed per sync run
    pub detail_limit: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookback_days: sync::DEFAULT_LOOKBACK_DAYS,
            detail_limit: sync::DEFAULT_DETAIL_LIMIT,
        }
    }
}

/// Server configuration assembled from the environment
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database URL
    pub database_url: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: Option<String>,
    /// Base64 AES-256 key for Strava tokens at rest
    pub token_encryption_key: Option<String>,
    /// Strava settings
    pub strava: StravaConfig,
    /// Sync settings
    pub sync: SyncConfig,
    /// Look-back window for the current VDOT
    pub fitness_window_days: u32,
    /// Comma-separated allowed CORS origins, `*` for any
    pub cors_allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: network::DEFAULT_HOST.to_owned(),
            http_port: network::DEFAULT_HTTP_PORT,
            environment: Environment::Development,
            database_url: network::DEFAULT_DATABASE_URL.to_owned(),
            jwt_secret: None,
            token_encryption_key: None,
            strava: StravaConfig::default(),
            sync: SyncConfig::default(),
            fitness_window_days: fitness::DEFAULT_WINDOW_DAYS,
            cors_allowed_origins: "*".to_owned(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("http_port", &self.http_port)
            .field("environment", &self.environment)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field(
                "token_encryption_key",
                &self.token_encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("strava", &self.strava)
            .field("sync", &self.sync)
            .field("fitness_window_days", &self.fitness_window_days)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `AppError::config` when a variable cannot be parsed or when a
    /// production configuration is missing a secret
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Self::default();
        let strava_defaults = defaults.strava;

        let http_port = env_parse("DREAMY_HTTP_PORT", defaults.http_port)?;
        let host = env_or("DREAMY_HOST", &defaults.host);
        let redirect_uri = env::var("STRAVA_REDIRECT_URI")
            .unwrap_or_else(|_| format!("http://{host}:{http_port}/strava/callback"));

        let config = Self {
            http_port,
            environment: Environment::from_str_or_default(&env_or("ENVIRONMENT", "development")),
            database_url: env_or("DATABASE_URL", &defaults.database_url),
            jwt_secret: env_opt("DREAMY_JWT_SECRET"),
            token_encryption_key: env_opt("DREAMY_TOKEN_ENCRYPTION_KEY"),
            strava: StravaConfig {
                client_id: env_opt("STRAVA_CLIENT_ID"),
                client_secret: env_opt("STRAVA_CLIENT_SECRET"),
                redirect_uri,
                webhook_verify_token: env_opt("STRAVA_WEBHOOK_VERIFY_TOKEN"),
                subscription_id: env_opt("STRAVA_SUBSCRIPTION_ID")
                    .map(|raw| parse_value("STRAVA_SUBSCRIPTION_ID", &raw))
                    .transpose()?,
                api_base: env_or("STRAVA_API_BASE", &strava_defaults.api_base),
                auth_url: env_or("STRAVA_AUTH_URL", &strava_defaults.auth_url),
                token_url: env_or("STRAVA_TOKEN_URL", &strava_defaults.token_url),
                deauthorize_url: env_or("STRAVA_DEAUTH_URL", &strava_defaults.deauthorize_url),
                scopes: env_opt("STRAVA_SCOPES")
                    .map_or(strava_defaults.scopes, |raw| parse_scopes(&raw)),
            },
            sync: SyncConfig {
                lookback_days: env_parse("DREAMY_SYNC_LOOKBACK_DAYS", defaults.sync.lookback_days)?,
                detail_limit: env_parse("DREAMY_SYNC_DETAIL_LIMIT", defaults.sync.detail_limit)?,
            },
            fitness_window_days: env_parse(
                "DREAMY_FITNESS_WINDOW_DAYS",
                defaults.fitness_window_days,
            )?,
            cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", &defaults.cors_allowed_origins),
            host,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for the current environment
    ///
    /// # Errors
    ///
    /// Returns an error when a production deployment lacks a required secret
    pub fn validate(&self) -> AppResult<()> {
        if self.fitness_window_days == 0 {
            return Err(AppError::config("DREAMY_FITNESS_WINDOW_DAYS must be positive"));
        }

        if self.environment.is_production() {
            let missing: Vec<&str> = [
                ("DREAMY_JWT_SECRET", self.jwt_secret.is_none()),
                ("DREAMY_TOKEN_ENCRYPTION_KEY", self.token_encryption_key.is_none()),
                ("STRAVA_CLIENT_ID", self.strava.client_id.is_none()),
                ("STRAVA_CLIENT_SECRET", self.strava.client_secret.is_none()),
                (
                    "STRAVA_WEBHOOK_VERIFY_TOKEN",
                    self.strava.webhook_verify_token.is_none(),
                ),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();

            if !missing.is_empty() {
                return Err(AppError::config(format!(
                    "Production configuration is missing: {}",
                    missing.join(", ")
                )));
            }
        } else if !self.strava.is_configured() {
            warn!("Strava OAuth is not configured; connect and sync endpoints will fail");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let flag = |enabled: bool| if enabled { "Enabled" } else { "Disabled" };
        format!(
            "Dreamy Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - Token Encryption Key: {}\n\
             - Strava OAuth: {}\n\
             - Strava Webhooks: {}\n\
             - Sync Lookback: {} days (detail limit {})\n\
             - Fitness Window: {} days\n\
             - CORS Origins: {}",
            self.environment,
            self.host,
            self.http_port,
            redact_database_url(&self.database_url),
            if self.jwt_secret.is_some() { "Configured" } else { "Ephemeral" },
            if self.token_encryption_key.is_some() { "Configured" } else { "Ephemeral" },
            flag(self.strava.is_configured()),
            flag(self.strava.webhook_verify_token.is_some()),
            self.sync.lookback_days,
            self.sync.detail_limit,
            self.fitness_window_days,
            self.cors_allowed_origins,
        )
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_owned())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    env_opt(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("Invalid {key} value: {raw}")))
}

/// Parse comma-separated scopes
fn parse_scopes(scopes_str: &str) -> Vec<String> {
    scopes_str
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

fn redact_database_url(url: &str) -> String {
    match url.split_once('@') {
        Some((_, host)) => format!("[REDACTED]@{host}"),
        None => url.to_owned(),
    }
}
