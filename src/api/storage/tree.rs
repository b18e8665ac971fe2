//! Operations on an in-memory JSON document tree.
//!
//! Mirrors realtime database semantics: writing `null` removes a value and
//! objects left empty by a removal disappear with it.

use serde_json::{Map, Value};

use super::traits::{DocPath, json_kind};
use super::StorageError;

/// Look up the value at `path`.
pub fn read<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() { None } else { Some(node) }
}

/// Overwrite the value at `path`, creating intermediate objects as needed.
pub fn write(root: &mut Value, path: &DocPath, value: Value) -> Result<(), StorageError> {
    if value.is_null() {
        remove(root, path);
        return Ok(());
    }
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return Ok(());
    };
    let mut node = root;
    for segment in parents {
        node = descend_or_create(node, segment, path)?;
    }
    as_object_mut(node, path)?.insert(last.clone(), value);
    Ok(())
}

/// Shallow merge `fields` into the object at `path`.
pub fn merge(root: &mut Value, path: &DocPath, fields: Map<String, Value>) -> Result<(), StorageError> {
    let mut node = root;
    for segment in path.segments() {
        node = descend_or_create(node, segment, path)?;
    }
    let target = as_object_mut(node, path)?;
    for (key, value) in fields {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
    Ok(())
}

/// Remove the value at `path` and prune objects that become empty.
pub fn remove(root: &mut Value, path: &DocPath) {
    if path.is_root() {
        *root = Value::Object(Map::new());
        return;
    }
    remove_at(root, path.segments());
}

fn remove_at(node: &mut Value, segments: &[String]) -> bool {
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return false,
    };
    if rest.is_empty() {
        map.remove(first);
    } else if let Some(child) = map.get_mut(first) {
        if remove_at(child, rest) {
            map.remove(first);
        }
    }
    map.is_empty()
}

fn descend_or_create<'a>(
    node: &'a mut Value,
    segment: &str,
    path: &DocPath,
) -> Result<&'a mut Value, StorageError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    let map = as_object_mut(node, path)?;
    let child = map
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if child.is_null() {
        *child = Value::Object(Map::new());
    }
    Ok(child)
}

fn as_object_mut<'a>(node: &'a mut Value, path: &DocPath) -> Result<&'a mut Map<String, Value>, StorageError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    let kind = json_kind(node);
    node.as_object_mut().ok_or_else(|| StorageError::Malformed {
        path: path.to_string(),
        reason: format!("cannot write below {}", kind),
    })
}
