//! Session routes.
//!
//! The identity provider's interactive flow happens in the browser; the
//! frontend posts the resulting ID token here to record the sign-in.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, ApiResult};
use crate::models::User;
use crate::services::{AuthUser, ServiceError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    id_token: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    user: AuthUser,
    profile: User,
}

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/me", get(me))
}

/// POST /auth/session - Verify an ID token and upsert the user record
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let user = state.jwt.verify_id_token(&request.id_token).map_err(ApiError::from)?;
    let profile = state.users.record_sign_in(&user).await?;
    info!("User {} signed in", user.id);
    Ok(Json(SessionResponse { user, profile }))
}

/// GET /auth/me - The caller's stored user record
async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    let user = state
        .users
        .get_user(&auth.user.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", &auth.user.id))?;
    Ok(Json(user))
}
