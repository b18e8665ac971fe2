//! Document store tests for the in-memory and file backends

use bpmn_modeler::models::{ModelRecord, ModelType, ProjectRecord};
use bpmn_modeler::storage::codec::{fetch_all, fetch_one, fetch_where};
use bpmn_modeler::storage::{
    Collection, DocPath, DocumentStore, FileStore, MemoryStore, StorageError,
};
use serde_json::{Map, Value, json};

fn path(p: &str) -> DocPath {
    DocPath::parse(p).unwrap()
}

#[tokio::test]
async fn test_set_get_update_delete() {
    let store = MemoryStore::new();
    let doc = path("users/u1");

    assert!(store.get(&doc).await.unwrap().is_none());

    store
        .set(&doc, json!({"email": "a@x.com", "displayName": "A"}))
        .await
        .unwrap();
    let mut fields = Map::new();
    fields.insert("displayName".to_string(), json!("Alice"));
    store.update(&doc, fields).await.unwrap();

    assert_eq!(
        store.get(&doc).await.unwrap(),
        Some(json!({"email": "a@x.com", "displayName": "Alice"}))
    );

    store.delete(&doc).await.unwrap();
    assert!(store.get(&doc).await.unwrap().is_none());
    assert_eq!(store.snapshot().await, json!({}));
}

#[tokio::test]
async fn test_create_keys_sort_in_creation_order() {
    let store = MemoryStore::new();
    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(store.create(Collection::Projects, json!({"n": i})).await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let keys: Vec<String> = store
        .get_collection(Collection::Projects)
        .await
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, ids);
}

#[tokio::test]
async fn test_get_where_filters_on_equality() {
    let store = MemoryStore::with_data(json!({
        "invitations": {
            "i1": {"invitedEmail": "b@x.com", "projectId": "p1"},
            "i2": {"invitedEmail": "c@x.com", "projectId": "p1"},
            "i3": {"invitedEmail": "b@x.com", "projectId": "p2"}
        }
    }));

    let found = store
        .get_where(Collection::Invitations, "invitedEmail", "b@x.com")
        .await
        .unwrap();
    let keys: Vec<&str> = found.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["i1", "i3"]);
}

#[tokio::test]
async fn test_update_paths_is_all_or_nothing() {
    let store = MemoryStore::with_data(json!({
        "projects": {"p1": {"name": "Ops"}}
    }));

    let result = store
        .update_paths(vec![
            (path("invitations/i1/status"), json!("Accepted")),
            (path("projects/p1/name/inner"), json!("editor")),
        ])
        .await;

    assert!(result.is_err());
    assert!(store.get(&path("invitations/i1")).await.unwrap().is_none());

    store
        .update_paths(vec![
            (path("invitations/i1/status"), json!("Accepted")),
            (path("projects/p1/members/u2"), json!("editor")),
        ])
        .await
        .unwrap();
    assert_eq!(
        store.get(&path("projects/p1/members/u2")).await.unwrap(),
        Some(json!("editor"))
    );
}

#[tokio::test]
async fn test_malformed_records_are_skipped() {
    let store = MemoryStore::with_data(json!({
        "projects": {
            "good": {"name": "Ops", "ownerId": "u1", "members": {"u1": "owner"}},
            "bad": {"name": 42},
            "odd": "not an object"
        }
    }));

    let projects = fetch_all::<ProjectRecord>(&store, Collection::Projects).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, "good");
    assert_eq!(projects[0].record.description, "");
}

#[tokio::test]
async fn test_fetch_one_reports_malformed_record() {
    let store = MemoryStore::with_data(json!({
        "projects": {"bad": {"name": 42}}
    }));

    let result = fetch_one::<ProjectRecord>(&store, Collection::Projects, "bad").await;
    assert!(matches!(result, Err(StorageError::Malformed { .. })));
    let missing = fetch_one::<ProjectRecord>(&store, Collection::Projects, "nope").await;
    assert!(missing.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_model_without_type_reads_as_bpmn() {
    let store = MemoryStore::with_data(json!({
        "bpmnModels": {
            "m1": {"projectId": "p1", "ownerId": "u1", "name": "Order", "xmlData": "<x/>"}
        }
    }));

    let models = fetch_where::<ModelRecord>(&store, Collection::Models, "projectId", "p1")
        .await
        .unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].record.model_type, ModelType::Bpmn);
}

#[tokio::test]
async fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("store.json");

    let id = {
        let store = FileStore::open(&file).await.unwrap();
        let id = store
            .create(Collection::Projects, json!({"name": "Ops"}))
            .await
            .unwrap();
        store
            .set(&path(&format!("projects/{}/members/u1", id)), json!("owner"))
            .await
            .unwrap();
        id
    };

    let reopened = FileStore::open(&file).await.unwrap();
    assert_eq!(
        reopened
            .get(&Collection::Projects.doc(&id).unwrap())
            .await
            .unwrap(),
        Some(json!({"name": "Ops", "members": {"u1": "owner"}}))
    );
}

#[tokio::test]
async fn test_file_store_rejected_batch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("store.json");
    let store = FileStore::open(&file).await.unwrap();
    store.set(&path("projects/p1/name"), json!("Ops")).await.unwrap();

    let result = store
        .update_paths(vec![
            (path("projects/p2/name"), json!("Other")),
            (path("projects/p1/name/inner"), json!(1)),
        ])
        .await;
    assert!(result.is_err());

    let on_disk: Value = serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"projects": {"p1": {"name": "Ops"}}}));
}

#[tokio::test]
async fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("store.json");
    std::fs::write(&file, b"{not json").unwrap();

    assert!(matches!(
        FileStore::open(&file).await,
        Err(StorageError::Malformed { .. })
    ));
}
