//! Authentication context extractor.
//!
//! Every project, model and invitation route takes an [`AuthContext`]; the
//! bearer token in the `Authorization` header is verified as an ID token.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use tracing::warn;

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::{AuthUser, JwtService};

/// The verified caller of a request.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: AuthUser,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                warn!("No authorization token provided");
                ApiError::unauthorized("Missing bearer token")
            })?;

        let user = state.jwt.verify_id_token(token).map_err(|e| {
            warn!("ID token validation failed: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthContext { user })
    }
}
