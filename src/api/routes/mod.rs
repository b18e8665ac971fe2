//! API routes module - organizes all route handlers.
//!
//! Everything except `/auth/session` and `/editor/settings` requires a bearer ID token.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod error;
pub mod invitations;
pub mod models;
pub mod projects;

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

pub use app_state::AppState;
pub use error::ApiError;

/// Create the main API router combining all route modules
///
/// State is applied by the caller with `.with_state(app_state)`.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_router())
        .nest("/projects", projects::projects_router())
        .nest("/models", models::models_router())
        .nest("/invitations", invitations::invitations_router())
        .route("/editor/settings", get(editor_settings))
}

/// GET /editor/settings - Adapter settings the frontend mounts editors with
async fn editor_settings(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "debounceMs": state.editor.debounce.as_millis() as u64,
        "emitViewport": state.editor.emit_viewport,
    }))
}
