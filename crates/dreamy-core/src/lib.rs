// ABOUTME: Core types and constants for the Dreamy running analytics service
// ABOUTME: Foundation crate with error handling, domain models, and unit conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![deny(unsafe_code)]

//! # Dreamy Core
//!
//! Foundation crate shared by the analytics engine and the service. It changes
//! rarely, so the rest of the workspace compiles incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Activities, splits, best efforts, races, profiles, Strava connections
//! - **units**: Distance, pace and duration conversions plus the standard race distances
//! - **constants**: Physiological bounds and limits shared across crates

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Activity, Split, `BestEffort`, `RaceResult`, etc.)
pub mod models;

/// Unit conversions and standard race distances
pub mod units;
