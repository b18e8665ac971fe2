//! Invitation routes for the invited user.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use crate::models::hydrated::pending_only;
use crate::models::{Invitation, InvitationDetails};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvitationQuery {
    #[serde(default)]
    pending_only: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    project_id: String,
}

pub fn invitations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invitations))
        .route("/{invitation_id}/accept", post(accept_invitation))
        .route("/{invitation_id}/decline", post(decline_invitation))
}

/// GET /invitations - Invitations addressed to the caller's email
async fn list_invitations(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<InvitationQuery>,
) -> ApiResult<Json<Vec<InvitationDetails>>> {
    let invitations = state.aggregation.load_invitations(&auth.user.email).await?;
    if query.pending_only {
        return Ok(Json(pending_only(invitations)));
    }
    Ok(Json(invitations))
}

/// POST /invitations/{invitation_id}/accept - Join the project as an editor
async fn accept_invitation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(invitation_id): Path<String>,
    Json(request): Json<AcceptRequest>,
) -> ApiResult<Json<Invitation>> {
    let invitation = state
        .invitations
        .accept(&invitation_id, &request.project_id, &auth.user)
        .await?;
    Ok(Json(invitation))
}

/// POST /invitations/{invitation_id}/decline
async fn decline_invitation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(invitation_id): Path<String>,
) -> ApiResult<Json<Invitation>> {
    Ok(Json(state.invitations.decline(&invitation_id, &auth.user).await?))
}
