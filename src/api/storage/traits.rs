//! Document store trait and path types shared by every backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::StorageError;

/// Top-level collections addressed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Users,
    Projects,
    Models,
    Invitations,
}

impl Collection {
    /// Key of the collection in the document tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Projects => "projects",
            Collection::Models => "bpmnModels",
            Collection::Invitations => "invitations",
        }
    }

    pub fn path(&self) -> DocPath {
        DocPath {
            segments: vec![self.as_str().to_string()],
        }
    }

    /// Path of a single document inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocPath, StorageError> {
        self.path().child(id)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slash-separated location in the document tree, e.g. `projects/{id}/members/{userId}`.
///
/// Segments follow the realtime database key rules: non-empty and free of
/// `.`, `$`, `#`, `[`, `]` and `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// The root of the tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated path. Leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        let mut parsed = Self::root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            parsed = parsed.child(segment)?;
        }
        Ok(parsed)
    }

    pub fn child(&self, key: &str) -> Result<Self, StorageError> {
        validate_key(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Check a single key against the realtime database key rules.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidPath("empty key".to_string()));
    }
    if key
        .chars()
        .any(|c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_control())
    {
        return Err(StorageError::InvalidPath(format!(
            "key '{}' contains a forbidden character",
            key
        )));
    }
    Ok(())
}

/// Path-addressed document store.
///
/// Every call is a single request/response; nothing here holds a subscription.
/// Views refresh by fetching again after each write.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`; `None` when nothing is stored there.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StorageError>;

    /// Read every document of a collection keyed by id.
    async fn get_collection(
        &self,
        collection: Collection,
    ) -> Result<Map<String, Value>, StorageError> {
        match self.get(&collection.path()).await? {
            Some(Value::Object(map)) => Ok(map),
            Some(other) => Err(StorageError::Malformed {
                path: collection.to_string(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
            None => Ok(Map::new()),
        }
    }

    /// Read the documents of a collection whose `field` equals `equals`.
    async fn get_where(
        &self,
        collection: Collection,
        field: &str,
        equals: &str,
    ) -> Result<Map<String, Value>, StorageError> {
        let all = self.get_collection(collection).await?;
        Ok(all
            .into_iter()
            .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(equals))
            .collect())
    }

    /// Store `value` under a freshly generated key in `collection` and return the key.
    async fn create(&self, collection: Collection, value: Value) -> Result<String, StorageError>;

    /// Overwrite the whole value at `path`. Writing `null` deletes it.
    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StorageError>;

    /// Shallow merge of `fields` into the object at `path`.
    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StorageError>;

    /// Remove the value at `path`.
    async fn delete(&self, path: &DocPath) -> Result<(), StorageError>;

    /// Write several locations.
    ///
    /// Backends that can apply the whole batch at once override this. The default
    /// issues independent writes in order and reports which paths landed before
    /// the first failure.
    async fn update_paths(&self, updates: Vec<(DocPath, Value)>) -> Result<(), StorageError> {
        let mut applied = Vec::with_capacity(updates.len());
        for (path, value) in updates {
            if let Err(e) = self.set(&path, value).await {
                return Err(StorageError::PartialWrite {
                    applied,
                    failed: path.to_string(),
                    reason: e.to_string(),
                });
            }
            applied.push(path.to_string());
        }
        Ok(())
    }

    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
