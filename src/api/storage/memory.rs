//! In-memory document store.
//!
//! Used for development and tests. The whole tree sits behind one lock, so
//! `update_paths` applies its batch atomically.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::{Collection, DocPath, DocumentStore};
use super::{StorageError, push_id, tree};

/// Document store holding its tree in process memory.
#[derive(Clone)]
pub struct MemoryStore {
    root: Arc<RwLock<Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
        }
    }

    /// Create a store seeded with an existing tree.
    pub fn with_data(data: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(data)),
        }
    }

    /// Copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StorageError> {
        let root = self.root.read().await;
        Ok(tree::read(&root, path).cloned())
    }

    async fn create(&self, collection: Collection, value: Value) -> Result<String, StorageError> {
        let id = push_id::generate();
        let path = collection.doc(&id)?;
        let mut root = self.root.write().await;
        tree::write(&mut root, &path, value)?;
        Ok(id)
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StorageError> {
        let mut root = self.root.write().await;
        tree::write(&mut root, path, value)
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StorageError> {
        let mut root = self.root.write().await;
        tree::merge(&mut root, path, fields)
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StorageError> {
        let mut root = self.root.write().await;
        tree::remove(&mut root, path);
        Ok(())
    }

    async fn update_paths(&self, updates: Vec<(DocPath, Value)>) -> Result<(), StorageError> {
        let mut root = self.root.write().await;
        // Stage on a copy so a rejected path leaves the tree untouched.
        let mut staged = root.clone();
        for (path, value) in updates {
            tree::write(&mut staged, &path, value)?;
        }
        *root = staged;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
