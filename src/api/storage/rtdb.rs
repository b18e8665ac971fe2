//! Realtime database REST backend.
//!
//! Talks to the database's REST surface: every path maps to `{base}/{path}.json`,
//! `POST` pushes a child and answers `{"name": "<id>"}`, `PATCH` merges, and
//! equality queries use `orderBy` / `equalTo` with JSON-encoded values.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::StorageError;
use super::traits::{Collection, DocPath, DocumentStore, json_kind};

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

/// Document store backed by the realtime database REST API.
#[derive(Clone)]
pub struct RtdbStore {
    client: Client,
    base_url: Url,
    auth: Option<String>,
}

impl RtdbStore {
    /// Create a client for the database at `base_url`.
    ///
    /// `auth` is passed as the `auth` query parameter (database secret or ID token).
    pub fn new(base_url: &str, auth: Option<String>) -> Result<Self, StorageError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| StorageError::ConnectionError(format!("Invalid database URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            auth,
        })
    }

    fn url(&self, path: &DocPath) -> Result<Url, StorageError> {
        self.base_url
            .join(&format!("{}.json", path))
            .map_err(|e| StorageError::InvalidPath(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &DocPath) -> Result<RequestBuilder, StorageError> {
        let url = self.url(path)?;
        debug!("{} {}", method, url.path());
        let mut builder = self.client.request(method, url);
        if let Some(auth) = &self.auth {
            builder = builder.query(&[("auth", auth.as_str())]);
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StorageError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        warn!("Realtime database returned {}: {}", status, message);
        Err(StorageError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_object(
        builder: RequestBuilder,
        what: &str,
    ) -> Result<Map<String, Value>, StorageError> {
        match Self::send(builder).await?.json::<Value>().await? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(StorageError::Malformed {
                path: what.to_string(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for RtdbStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StorageError> {
        let value: Value = Self::send(self.request(Method::GET, path)?).await?.json().await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn get_where(
        &self,
        collection: Collection,
        field: &str,
        equals: &str,
    ) -> Result<Map<String, Value>, StorageError> {
        let order_by = Value::String(field.to_string()).to_string();
        let equal_to = Value::String(equals.to_string()).to_string();
        let builder = self
            .request(Method::GET, &collection.path())?
            .query(&[("orderBy", order_by.as_str()), ("equalTo", equal_to.as_str())]);
        Self::read_object(builder, collection.as_str()).await
    }

    async fn create(&self, collection: Collection, value: Value) -> Result<String, StorageError> {
        let builder = self.request(Method::POST, &collection.path())?.json(&value);
        let pushed: PushResponse = Self::send(builder).await?.json().await?;
        Ok(pushed.name)
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StorageError> {
        Self::send(self.request(Method::PUT, path)?.json(&value)).await?;
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StorageError> {
        Self::send(self.request(Method::PATCH, path)?.json(&fields)).await?;
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StorageError> {
        Self::send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// Multi-location update: one `PATCH` at the root, applied atomically by the database.
    async fn update_paths(&self, updates: Vec<(DocPath, Value)>) -> Result<(), StorageError> {
        let body: Map<String, Value> = updates
            .into_iter()
            .map(|(path, value)| (format!("/{}", path), value))
            .collect();
        Self::send(self.request(Method::PATCH, &DocPath::root())?.json(&body)).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "rtdb"
    }
}
