// ABOUTME: Configuration module root
// ABOUTME: Environment-only server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

/// Environment-based server configuration
pub mod environment;

pub use environment::{Environment, ServerConfig, StravaConfig, SyncConfig};
