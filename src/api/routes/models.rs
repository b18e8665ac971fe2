//! Model routes.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, ApiResult};
use crate::models::Model;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveModelRequest {
    xml_data: String,
}

#[derive(Deserialize)]
pub struct RenameModelRequest {
    name: String,
}

pub fn models_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{model_id}",
            get(get_model)
                .put(save_model)
                .patch(rename_model)
                .delete(delete_model),
        )
        .route("/{model_id}/duplicate", post(duplicate_model))
        .route("/{model_id}/export", get(export_model))
}

/// GET /models/{model_id}
async fn get_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
) -> ApiResult<Json<Model>> {
    Ok(Json(state.models.get_model(&auth.user, &model_id).await?))
}

/// PUT /models/{model_id} - Replace the stored XML
async fn save_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
    Json(request): Json<SaveModelRequest>,
) -> ApiResult<Json<Model>> {
    let model = state
        .models
        .save_model(&auth.user, &model_id, &request.xml_data)
        .await?;
    Ok(Json(model))
}

/// PATCH /models/{model_id}
async fn rename_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
    Json(request): Json<RenameModelRequest>,
) -> ApiResult<Json<Model>> {
    let model = state
        .models
        .rename_model(&auth.user, &model_id, &request.name)
        .await?;
    Ok(Json(model))
}

/// DELETE /models/{model_id}
async fn delete_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.models.delete_model(&auth.user, &model_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /models/{model_id}/duplicate
async fn duplicate_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    let copy = state.models.duplicate_model(&auth.user, &model_id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// GET /models/{model_id}/export - The stored document as a file download
async fn export_model(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(model_id): Path<String>,
) -> ApiResult<Response<Body>> {
    let file = state.models.export_model(&auth.user, &model_id).await?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(file.content_type))
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name)).map_err(export_failed)?,
        )
        .body(Body::from(file.content))
        .map_err(export_failed)
}

fn export_failed(e: impl std::fmt::Display) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to build export response: {}", e),
    )
}
