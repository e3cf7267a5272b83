// ABOUTME: Random CSRF state values for the OAuth authorization redirect
// ABOUTME: URL-safe base64 of 32 bytes from the thread RNG
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dreamy_core::constants::oauth::STATE_BYTES;
use rand::RngCore;

/// Generate a fresh state value
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0_u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_url_safe_and_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
