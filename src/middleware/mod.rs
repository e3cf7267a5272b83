// ABOUTME: HTTP middleware for request ids, authentication and CORS
// ABOUTME: Layers and extractors shared by every route group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

/// Bearer token extraction
pub mod auth;
/// Cross-origin configuration
pub mod cors;
/// Request correlation ids
pub mod request_id;

pub use auth::{bearer_token, AuthenticatedUser};
pub use cors::setup_cors;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
