// ABOUTME: Domain service layer between the HTTP routes and storage
// ABOUTME: Token lifecycle, Strava authorization and sync, and analytics orchestration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Domain service layer
//!
//! Route handlers stay thin: they authenticate, parse input and call into
//! these services, which own the business rules.

/// Analytics orchestration over stored rows
pub mod analytics;

/// Strava authorization-code flow
pub mod oauth_flow;

/// Strava activity import
pub mod sync;

/// Strava token storage, refresh and revocation
pub mod token_manager;

pub use analytics::{AnalyticsService, FitnessQuery, LoadQuery};
pub use oauth_flow::{CallbackParams, OAuthFlow};
pub use sync::{SyncReport, SyncService};
pub use token_manager::TokenManager;
