//! Custom Extractors
//!
//! Axum extractors for authentication and request parsing.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;

use crate::domain::User;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Token passed as `?token=` by clients that cannot set upgrade headers
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// User resolved from the handshake bearer credential
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Header first, then query string
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => Some(bearer.token().to_owned()),
            Err(_) => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.token),
        };

        let user = state
            .authenticator
            .authenticate(token.as_deref())
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Handshake rejected");
                AppError::from(e)
            })?;

        Ok(AuthenticatedUser(user))
    }
}
