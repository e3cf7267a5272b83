// ABOUTME: Shared helpers used across the service
// ABOUTME: Currently the pooled HTTP clients for Strava calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

/// HTTP client configuration
pub mod http_client;
