// ABOUTME: Shared helpers for integration tests
// ABOUTME: Router request builders, fixtures and a scripted Strava API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![allow(dead_code)]

pub mod axum_test;
pub mod fake_strava;
pub mod fixtures;
