// ABOUTME: Tests for token encryption at rest
// ABOUTME: Round trips, user binding, key parsing and environment-dependent key loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use base64::{engine::general_purpose::STANDARD, Engine};
use dreamy::config::Environment;
use dreamy::crypto::{TokenCipher, CIPHERTEXT_VERSION};
use dreamy::errors::ErrorCode;
use uuid::Uuid;

#[test]
fn test_round_trip_uses_fresh_nonces() {
    let cipher = TokenCipher::generate();
    let user_id = Uuid::new_v4();

    let first = cipher.encrypt("strava-access-token", user_id).unwrap();
    let second = cipher.encrypt("strava-access-token", user_id).unwrap();

    assert!(first.starts_with(CIPHERTEXT_VERSION));
    assert!(!first.contains("strava-access-token"));
    assert_ne!(first, second);
    assert_eq!(cipher.decrypt(&first, user_id).unwrap(), "strava-access-token");
    assert_eq!(cipher.decrypt(&second, user_id).unwrap(), "strava-access-token");
}

#[test]
fn test_ciphertext_is_bound_to_user_and_key() {
    let cipher = TokenCipher::generate();
    let owner = Uuid::new_v4();
    let encrypted = cipher.encrypt("refresh", owner).unwrap();

    assert!(cipher.decrypt(&encrypted, Uuid::new_v4()).is_err());
    assert!(TokenCipher::generate().decrypt(&encrypted, owner).is_err());
}

#[test]
fn test_rejects_unknown_version_and_truncated_data() {
    let cipher = TokenCipher::generate();
    let user_id = Uuid::new_v4();
    let encrypted = cipher.encrypt("token", user_id).unwrap();

    let unversioned = encrypted.trim_start_matches(CIPHERTEXT_VERSION);
    assert!(cipher.decrypt(unversioned, user_id).is_err());
    assert!(cipher.decrypt("v1:AAAA", user_id).is_err());
    assert!(cipher.decrypt("v1:not base64!", user_id).is_err());
}

#[test]
fn test_base64_key_must_be_32_bytes() {
    let key = STANDARD.encode([7_u8; 32]);
    let cipher = TokenCipher::from_base64(&key).unwrap();
    let user_id = Uuid::new_v4();
    let encrypted = cipher.encrypt("token", user_id).unwrap();
    let same_key = TokenCipher::from_bytes([7_u8; 32]);
    assert_eq!(same_key.decrypt(&encrypted, user_id).unwrap(), "token");

    let short = STANDARD.encode([7_u8; 16]);
    assert_eq!(
        TokenCipher::from_base64(&short).unwrap_err().code,
        ErrorCode::ConfigError
    );
    assert_eq!(
        TokenCipher::from_base64("%%%").unwrap_err().code,
        ErrorCode::ConfigError
    );
}

#[test]
fn test_missing_key_is_fatal_only_in_production() {
    assert!(TokenCipher::load_or_generate(None, Environment::Development).is_ok());
    assert_eq!(
        TokenCipher::load_or_generate(None, Environment::Production)
            .unwrap_err()
            .code,
        ErrorCode::ConfigError
    );

    let key = STANDARD.encode([1_u8; 32]);
    assert!(TokenCipher::load_or_generate(Some(&key), Environment::Production).is_ok());
}

#[test]
fn test_debug_output_redacts_key() {
    let cipher = TokenCipher::from_bytes([42_u8; 32]);
    let debug = format!("{cipher:?}");
    assert!(debug.contains("REDACTED"));
    assert!(!debug.contains("42"));
}
