// ABOUTME: Bearer token extractor for authenticated routes
// ABOUTME: Resolves the Authorization header to the caller's user id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use dreamy_core::errors::AppError;
use tracing::Span;
use uuid::Uuid;

use super::request_id::RequestId;
use crate::resources::ServerResources;

/// The caller of an authenticated route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User id from the token subject
    pub user_id: Uuid,
}

/// Pull the token out of `Authorization: Bearer <token>`
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when the header is absent and `AUTH_INVALID`
/// when it is not a bearer credential
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(AppError::auth_required)?;
    let value = header
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<ServerResources>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resources = Arc::<ServerResources>::from_ref(state);
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.as_str().to_owned());

        let user_id = bearer_token(parts)
            .and_then(|token| resources.auth.authenticate(token))
            .map_err(|error| match request_id {
                Some(id) => error.with_request_id(id),
                None => error,
            })?;

        Span::current().record("user_id", tracing::field::display(user_id));
        Ok(Self { user_id })
    }
}
