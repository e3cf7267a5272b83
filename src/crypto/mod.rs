// ABOUTME: Cryptography module for tokens at rest
// ABOUTME: Re-exports the AES-256-GCM token cipher
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Cryptographic utilities for the Dreamy service

/// AES-256-GCM token cipher
pub mod keys;

pub use keys::{TokenCipher, CIPHERTEXT_VERSION};
