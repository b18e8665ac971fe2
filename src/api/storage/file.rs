//! File-backed document store.
//!
//! Keeps the tree in memory and rewrites a single JSON file after every
//! mutation. Writes go to a sibling temporary file first and are renamed into
//! place, so a crash never leaves a half-written store behind.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::traits::{Collection, DocPath, DocumentStore};
use super::{StorageError, push_id, tree};

/// Document store persisted to one JSON file.
pub struct FileStore {
    path: PathBuf,
    root: RwLock<Value>,
}

impl FileStore {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let root = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Value::Object(Map::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StorageError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Store file {:?} not found, starting empty", path);
                Value::Object(Map::new())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            root: RwLock::new(root),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, root: &Value) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(root)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted store to {:?}", self.path);
        Ok(())
    }

    /// Apply `change` to a copy of the tree, persist it, then swap it in.
    async fn mutate<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Value) -> Result<(), StorageError> + Send,
    {
        let mut root = self.root.write().await;
        let mut staged = root.clone();
        change(&mut staged)?;
        self.persist(&staged).await?;
        *root = staged;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StorageError> {
        let root = self.root.read().await;
        Ok(tree::read(&root, path).cloned())
    }

    async fn create(&self, collection: Collection, value: Value) -> Result<String, StorageError> {
        let id = push_id::generate();
        let path = collection.doc(&id)?;
        self.mutate(|root| tree::write(root, &path, value)).await?;
        Ok(id)
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StorageError> {
        self.mutate(|root| tree::write(root, path, value)).await
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StorageError> {
        self.mutate(|root| tree::merge(root, path, fields)).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StorageError> {
        self.mutate(|root| {
            tree::remove(root, path);
            Ok(())
        })
        .await
    }

    async fn update_paths(&self, updates: Vec<(DocPath, Value)>) -> Result<(), StorageError> {
        self.mutate(|root| {
            for (path, value) in updates {
                tree::write(root, &path, value)?;
            }
            Ok(())
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
