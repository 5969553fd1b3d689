//! JSON loading at the collection boundary.
//!
//! The `read_*` functions report failures. The `load_*` functions follow the
//! boundary contract used by [`Collection::from_file`](crate::Collection::from_file)
//! and friends: an unreadable file, invalid JSON or a non-object document
//! yields an empty map, and the failure is logged rather than returned.

use std::path::Path;

use crate::{
    Result,
    value::{Map, Value},
};

/// Parses `text` as a JSON document.
pub fn read_json_str(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and parses the JSON document at `path`.
pub fn read_json_file(path: impl AsRef<Path>) -> Result<Value> {
    let text = std::fs::read_to_string(path.as_ref())?;
    read_json_str(&text)
}

/// Parses `text` into a map, optionally descending into the top-level `root` key.
///
/// Returns an empty map on any failure.
pub fn load_json_str(text: &str, root: Option<&str>) -> Map {
    match read_json_str(text) {
        Ok(value) => select_root(value, root),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to parse JSON document, using empty data");
            Map::new()
        }
    }
}

/// Reads `path` into a map, optionally descending into the top-level `root` key.
///
/// Returns an empty map on any failure.
pub fn load_json_file(path: impl AsRef<Path>, root: Option<&str>) -> Map {
    let path = path.as_ref();
    match read_json_file(path) {
        Ok(value) => select_root(value, root),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Failed to load JSON file, using empty data"
            );
            Map::new()
        }
    }
}

fn select_root(value: Value, root: Option<&str>) -> Map {
    let found = value.type_name();
    let Value::Map(mut data) = value else {
        tracing::warn!(
            found,
            "JSON document is not an object, using empty data"
        );
        return Map::new();
    };

    match root {
        Some(key) if data.get(key).is_some_and(Value::is_map) => match data.swap_remove(key) {
            Some(Value::Map(inner)) => inner,
            _ => Map::new(),
        },
        _ => data,
    }
}
