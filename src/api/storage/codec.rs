//! Typed decoding at the store boundary.
//!
//! Raw documents come back as arbitrary JSON. Everything the services see goes
//! through these helpers, which decode against the entity schemas and skip
//! (with a warning) records that do not fit instead of passing them on.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::StorageError;
use super::traits::{Collection, DocPath, DocumentStore};
use crate::models::Keyed;

/// Decode every record of a fetched collection, dropping malformed ones.
pub fn decode_collection<T: DeserializeOwned>(
    collection: Collection,
    docs: Map<String, Value>,
) -> Vec<Keyed<T>> {
    docs.into_iter()
        .filter_map(|(id, doc)| match serde_json::from_value::<T>(doc) {
            Ok(record) => Some(Keyed { id, record }),
            Err(e) => {
                warn!("Skipping malformed record {}/{}: {}", collection, id, e);
                None
            }
        })
        .collect()
}

/// Decode a single record; a malformed record is an error here.
pub fn decode_one<T: DeserializeOwned>(path: &DocPath, doc: Value) -> Result<T, StorageError> {
    serde_json::from_value(doc).map_err(|e| StorageError::Malformed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a record for storage.
pub fn encode<T: Serialize>(record: &T) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(record)?)
}

/// Fetch and decode a whole collection.
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<Vec<Keyed<T>>, StorageError> {
    let docs = store.get_collection(collection).await?;
    Ok(decode_collection(collection, docs))
}

/// Fetch and decode the records of a collection whose `field` equals `equals`.
pub async fn fetch_where<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    field: &str,
    equals: &str,
) -> Result<Vec<Keyed<T>>, StorageError> {
    let docs = store.get_where(collection, field, equals).await?;
    Ok(decode_collection(collection, docs))
}

/// Fetch and decode one document by id.
pub async fn fetch_one<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<Keyed<T>>, StorageError> {
    let path = collection.doc(id)?;
    match store.get(&path).await? {
        Some(doc) => Ok(Some(Keyed {
            id: id.to_string(),
            record: decode_one(&path, doc)?,
        })),
        None => Ok(None),
    }
}
