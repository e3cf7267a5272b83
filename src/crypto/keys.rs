// ABOUTME: AES-256-GCM encryption of OAuth tokens at rest
// ABOUTME: Versioned ciphertext bound to the owning user through associated data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Token encryption
//!
//! Ciphertext layout: `v1:` followed by base64 of `nonce (12 bytes) || ciphertext || tag`.
//! The owning user's id is authenticated as associated data, so a value
//! copied into another user's row fails to decrypt.

use std::fmt;

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use dreamy_core::errors::{AppError, AppResult};
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::Environment;

/// Prefix identifying the ciphertext format
pub const CIPHERTEXT_VERSION: &str = "v1:";
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// AES-256-GCM cipher for Strava tokens
pub struct TokenCipher {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl TokenCipher {
    /// Create a cipher from raw key bytes
    #[must_use]
    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Create a cipher from a base64-encoded 32-byte key
    ///
    /// # Errors
    ///
    /// Returns a config error if the value is not base64 or not 32 bytes long
    pub fn from_base64(encoded: &str) -> AppResult<Self> {
        let decoded = Zeroizing::new(STANDARD.decode(encoded.trim()).map_err(|e| {
            AppError::config(format!(
                "Invalid base64 encoding in DREAMY_TOKEN_ENCRYPTION_KEY: {e}"
            ))
        })?);
        if decoded.len() != KEY_LEN {
            return Err(AppError::config(format!(
                "Token encryption key must be exactly {KEY_LEN} bytes, got {} bytes",
                decoded.len()
            )));
        }
        let mut key = [0_u8; KEY_LEN];
        key.copy_from_slice(&decoded);
        Ok(Self::from_bytes(key))
    }

    /// Generate a random key
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0_u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::from_bytes(key)
    }

    /// Load the configured key, or generate an ephemeral one outside production
    ///
    /// # Errors
    ///
    /// Returns a config error in production when no key is configured, or
    /// when the configured key is malformed
    pub fn load_or_generate(encoded: Option<&str>, environment: Environment) -> AppResult<Self> {
        if let Some(encoded) = encoded {
            info!("Loading token encryption key from environment");
            return Self::from_base64(encoded);
        }
        if environment.is_production() {
            return Err(AppError::config(
                "DREAMY_TOKEN_ENCRYPTION_KEY is required in production",
            ));
        }
        warn!("DREAMY_TOKEN_ENCRYPTION_KEY not set; generating an ephemeral key");
        warn!("Stored Strava tokens will not decrypt after a restart");
        Ok(Self::generate())
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_slice()))
    }

    /// Encrypt a token for `user_id`
    ///
    /// # Errors
    ///
    /// Returns an internal error if encryption fails
    pub fn encrypt(&self, plaintext: &str, user_id: Uuid) -> AppResult<String> {
        let mut nonce_bytes = [0_u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let aad = user_id.as_bytes();
        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad,
                },
            )
            .map_err(|_| AppError::internal("Token encryption failed"))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(format!("{CIPHERTEXT_VERSION}{}", STANDARD.encode(combined)))
    }

    /// Decrypt a token previously encrypted for `user_id`
    ///
    /// # Errors
    ///
    /// Returns an internal error if the format is unknown, the data is
    /// truncated, or authentication fails (wrong key or wrong user)
    pub fn decrypt(&self, encoded: &str, user_id: Uuid) -> AppResult<String> {
        let body = encoded
            .strip_prefix(CIPHERTEXT_VERSION)
            .ok_or_else(|| AppError::internal("Unsupported token ciphertext version"))?;
        let combined = STANDARD
            .decode(body)
            .map_err(|_| AppError::internal("Token ciphertext is not valid base64"))?;
        if combined.len() <= NONCE_LEN {
            return Err(AppError::internal("Token ciphertext is truncated"));
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);

        let plaintext = Zeroizing::new(
            self.cipher()
                .decrypt(
                    Nonce::from_slice(nonce),
                    Payload {
                        msg: ciphertext,
                        aad: user_id.as_bytes(),
                    },
                )
                .map_err(|_| AppError::internal("Token decryption failed"))?,
        );

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| AppError::internal("Decrypted token is not UTF-8"))
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
