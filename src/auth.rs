// ABOUTME: Bearer token issuing and validation for the JSON API
// ABOUTME: HS256 JWTs whose subject is the athlete's user id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Authentication
//!
//! Tokens are normally minted by the upstream identity layer with the
//! shared secret; [`AuthManager::issue_token`] exists for development and
//! tests.

use std::fmt;

use chrono::{Duration, Utc};
use dreamy_core::errors::{AppError, AppResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::Environment;

/// Default lifetime of tokens issued locally
pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Issues and validates HS256 bearer tokens
pub struct AuthManager {
    secret: Zeroizing<Vec<u8>>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a manager from a shared secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            token_expiry_hours,
        }
    }

    /// Use the configured secret, or a random one outside production
    ///
    /// # Errors
    ///
    /// Returns a config error in production when no secret is configured
    pub fn load_or_generate(secret: Option<&str>, environment: Environment) -> AppResult<Self> {
        if let Some(secret) = secret {
            return Ok(Self::new(secret.as_bytes(), DEFAULT_TOKEN_EXPIRY_HOURS));
        }
        if environment.is_production() {
            return Err(AppError::config("DREAMY_JWT_SECRET is required in production"));
        }
        warn!("DREAMY_JWT_SECRET not set; generating an ephemeral secret");
        let mut secret = Zeroizing::new(vec![0_u8; 64]);
        rand::thread_rng().fill_bytes(&mut secret);
        Ok(Self::new(&secret, DEFAULT_TOKEN_EXPIRY_HOURS))
    }

    /// Issue a token for `user_id` valid for the configured lifetime
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn issue_token(&self, user_id: Uuid) -> AppResult<String> {
        self.issue_token_with_expiry(user_id, Duration::hours(self.token_expiry_hours))
    }

    /// Issue a token with an explicit lifetime (negative values yield an expired token)
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn issue_token_with_expiry(&self, user_id: Uuid, lifetime: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` for an expired token and `AUTH_INVALID` for any
    /// other failure
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| convert_jwt_error(&e))
    }

    /// Validate a token and return the user id it names
    ///
    /// # Errors
    ///
    /// Returns the validation error, or `AUTH_INVALID` when `sub` is not a UUID
    pub fn authenticate(&self, token: &str) -> AppResult<Uuid> {
        let claims = self.validate_token(token)?;
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("secret", &"[REDACTED]")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish()
    }
}

fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> AppError {
    debug!("JWT validation failed: {e:?}");
    match e.kind() {
        ErrorKind::ExpiredSignature => AppError::auth_expired("Token has expired"),
        ErrorKind::InvalidSignature => {
            AppError::auth_invalid("Token signature verification failed")
        }
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            AppError::auth_invalid("Token is malformed")
        }
        _ => AppError::auth_invalid(format!("Token validation failed: {e}")),
    }
}
