//! Project routes, including the models and invitations created inside a project.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, ApiResult};
use crate::models::{HydratedProject, Invitation, Model, ModelType, Project};
use crate::services::DeleteReport;

#[derive(Deserialize)]
pub struct NameRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct CreateModelRequest {
    name: String,
    #[serde(rename = "type", default)]
    model_type: ModelType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadModelRequest {
    file_name: String,
    content: String,
}

#[derive(Deserialize)]
pub struct InviteRequest {
    email: String,
}

pub fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{project_id}",
            get(get_project).patch(rename_project).delete(delete_project),
        )
        .route("/{project_id}/members/{member_id}", delete(remove_member))
        .route("/{project_id}/models", post(create_model))
        .route("/{project_id}/models/upload", post(upload_model))
        .route("/{project_id}/invitations", post(invite))
}

/// GET /projects - Every project the caller belongs to, with members and models
async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<HydratedProject>>> {
    Ok(Json(state.aggregation.load_projects_for_user(&auth.user.id).await?))
}

/// POST /projects
async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create_project(&auth.user, &request.name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/{project_id}
async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
) -> ApiResult<Json<HydratedProject>> {
    state
        .aggregation
        .load_projects_for_user(&auth.user.id)
        .await?
        .into_iter()
        .find(|p| p.id == project_id)
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Project '{}' not found", project_id)))
}

/// PATCH /projects/{project_id}
async fn rename_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
    Json(request): Json<NameRequest>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .rename_project(&auth.user, &project_id, &request.name)
        .await?;
    Ok(Json(project))
}

/// DELETE /projects/{project_id} - Also removes the project's models and invitations
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DeleteReport>> {
    Ok(Json(state.projects.delete_project(&auth.user, &project_id).await?))
}

/// DELETE /projects/{project_id}/members/{member_id}
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((project_id, member_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .remove_member(&auth.user, &project_id, &member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /projects/{project_id}/models - New model from the notation's skeleton
async fn create_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
    Json(request): Json<CreateModelRequest>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    let model = state
        .models
        .create_model(&auth.user, &project_id, &request.name, request.model_type)
        .await?;
    Ok((StatusCode::CREATED, Json(model)))
}

/// POST /projects/{project_id}/models/upload - New model from a .bpmn or .dmn file
async fn upload_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
    Json(request): Json<UploadModelRequest>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    let model = state
        .models
        .upload_model(&auth.user, &project_id, &request.file_name, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(model)))
}

/// POST /projects/{project_id}/invitations
async fn invite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<String>,
    Json(request): Json<InviteRequest>,
) -> ApiResult<(StatusCode, Json<Invitation>)> {
    let invitation = state
        .invitations
        .invite(&auth.user, &project_id, &request.email)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}
