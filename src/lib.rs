// ABOUTME: Main library entry point for the Dreamy running analytics service
// ABOUTME: Wires configuration, storage, Strava integration, services and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

#![deny(unsafe_code)]

//! # Dreamy
//!
//! A service for runners. It stores manually entered and Strava-synced
//! activities in SQLite and serves analytics over a JSON API: VDOT fitness
//! estimation, CTL/ATL/TSB training load, threshold detection from
//! heart-rate splits and personal records.
//!
//! ## Architecture
//!
//! - **`dreamy-core`**: `AppError`, domain models, units, constants
//! - **`dreamy-intelligence`**: pure analytics over fetched rows
//! - **this crate**: persistence, the Strava OAuth client and API, token
//!   lifecycle, sync, webhooks and the axum router
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dreamy::config::ServerConfig;
//! use dreamy::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     dreamy::server::run(resources).await?;
//!     Ok(())
//! }
//! ```

/// Bearer token issuing and validation
pub mod auth;

/// Environment configuration
pub mod config;

/// Token encryption at rest
pub mod crypto;

/// `SQLite` storage
pub mod database;

/// Structured logging setup
pub mod logging;

/// Request ids, authentication extractor and CORS
pub mod middleware;

/// Strava `OAuth2` client
pub mod oauth2_client;

/// Strava API client
pub mod providers;

/// Shared server state
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Sync, token lifecycle, OAuth flow and analytics orchestration
pub mod services;

/// HTTP client construction
pub mod utils;

/// Strava webhook handling
pub mod webhooks;

pub use dreamy_core::errors;
pub use dreamy_core::models;
