//! HTTP surface tests over an in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use bpmn_modeler::config::AppConfig;
use bpmn_modeler::routes::{AppState, create_api_router};
use bpmn_modeler::services::{AuthUser, JwtService};
use bpmn_modeler::storage::MemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;

struct Harness {
    server: TestServer,
    jwt: JwtService,
}

impl Harness {
    fn new() -> Self {
        let config = AppConfig::development();
        let state = AppState::new(&config, Arc::new(MemoryStore::new()));
        let router = create_api_router().with_state(state);
        Self {
            server: TestServer::new(router).unwrap(),
            jwt: JwtService::from_config(&config),
        }
    }

    fn token(&self, user: &AuthUser) -> String {
        self.jwt
            .issue_id_token(user, chrono::Duration::hours(1))
            .unwrap()
    }
}

fn alice() -> AuthUser {
    AuthUser {
        id: "alice".to_string(),
        display_name: "Alice".to_string(),
        email: "a@x.com".to_string(),
        image_url: None,
    }
}

fn bob() -> AuthUser {
    AuthUser {
        id: "bob".to_string(),
        display_name: "Bob".to_string(),
        email: "b@x.com".to_string(),
        image_url: None,
    }
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let h = Harness::new();

    let response = h.server.get("/projects").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["status"], 401);
    assert!(body["error"].is_string());

    let response = h
        .server
        .get("/projects")
        .authorization_bearer("not-a-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_records_sign_in() {
    let h = Harness::new();
    let token = h.token(&alice());

    let response = h
        .server
        .post("/auth/session")
        .json(&json!({ "idToken": token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], "alice");
    assert_eq!(body["profile"]["displayName"], "Alice");

    let me: Value = h.server.get("/auth/me").authorization_bearer(&token).await.json();
    assert_eq!(me["id"], "alice");
    assert_eq!(me["email"], "a@x.com");
}

#[tokio::test]
async fn test_project_model_and_invitation_flow() {
    let h = Harness::new();
    let alice_token = h.token(&alice());
    let bob_token = h.token(&bob());

    let response = h
        .server
        .post("/projects")
        .authorization_bearer(&alice_token)
        .json(&json!({ "name": "Ops" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let project: Value = response.json();
    let project_id = project["id"].as_str().unwrap().to_string();
    assert_eq!(project["members"], json!({"alice": "owner"}));

    let response = h
        .server
        .post(&format!("/projects/{}/models", project_id))
        .authorization_bearer(&alice_token)
        .json(&json!({ "name": "Risk Class", "type": "dmn" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let model: Value = response.json();
    let model_id = model["id"].as_str().unwrap().to_string();
    assert_eq!(model["type"], "dmn");

    let response = h
        .server
        .get(&format!("/models/{}", model_id))
        .authorization_bearer(&bob_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = h
        .server
        .post(&format!("/projects/{}/invitations", project_id))
        .authorization_bearer(&alice_token)
        .json(&json!({ "email": "b@x.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let invitation_id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    let inbox: Value = h
        .server
        .get("/invitations")
        .add_query_param("pendingOnly", true)
        .authorization_bearer(&bob_token)
        .await
        .json();
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["projectName"], "Ops");

    let response = h
        .server
        .post(&format!("/invitations/{}/accept", invitation_id))
        .authorization_bearer(&bob_token)
        .json(&json!({ "projectId": project_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "Accepted");

    let response = h
        .server
        .post(&format!("/invitations/{}/decline", invitation_id))
        .authorization_bearer(&bob_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = h
        .server
        .put(&format!("/models/{}", model_id))
        .authorization_bearer(&bob_token)
        .json(&json!({ "xmlData": "<definitions/>" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let projects: Value = h
        .server
        .get("/projects")
        .authorization_bearer(&bob_token)
        .await
        .json();
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["models"][0]["xmlData"], "<definitions/>");
    assert_eq!(projects[0]["members"].as_array().unwrap().len(), 2);

    let response = h
        .server
        .delete(&format!("/projects/{}", project_id))
        .authorization_bearer(&bob_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = h
        .server
        .delete(&format!("/projects/{}", project_id))
        .authorization_bearer(&alice_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["modelsDeleted"], json!([model_id]));

    let response = h
        .server
        .get(&format!("/projects/{}", project_id))
        .authorization_bearer(&alice_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_and_export() {
    let h = Harness::new();
    let token = h.token(&alice());
    let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"><bpmn:process id="p" name="Order Handling"/></bpmn:definitions>"#;

    let project: Value = h
        .server
        .post("/projects")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Ops" }))
        .await
        .json();
    let project_id = project["id"].as_str().unwrap();

    let response = h
        .server
        .post(&format!("/projects/{}/models/upload", project_id))
        .authorization_bearer(&token)
        .json(&json!({ "fileName": "orders.bpmn", "content": xml }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let model: Value = response.json();
    assert_eq!(model["name"], "Order Handling");

    let response = h
        .server
        .get(&format!("/models/{}/export", model["id"].as_str().unwrap()))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"order-handling.bpmn\""
    );
    assert_eq!(response.text(), xml);

    let response = h
        .server
        .post(&format!("/projects/{}/models/upload", project_id))
        .authorization_bearer(&token)
        .json(&json!({ "fileName": "orders.xml", "content": xml }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_editor_settings() {
    let h = Harness::new();

    let settings: Value = h.server.get("/editor/settings").await.json();
    assert_eq!(settings, json!({ "debounceMs": 300, "emitViewport": false }));
}
