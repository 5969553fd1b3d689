//! Owned nested collections with path access and batch mutation.
//!
//! A [`Collection`] owns exactly one root [`Map`]. It exposes key-level access,
//! typed getters, path-based access (via [`crate::path`]) and the batch
//! mutations built on [`crate::merge`].
//!
//! # Examples
//!
//! ```
//! use propbag::{Collection, Equality, Value};
//!
//! let mut config = Collection::new();
//! config.set("name", "demo");
//! config.set_value_at_path("mail/smtp/port", 587)?;
//! config.add("tags", "a");
//! config.add("tags", "a");
//! config.push("tags", "1", None, Equality::Loose)?;
//!
//! assert_eq!(config.get_string("name", None), Some("demo".to_string()));
//! assert_eq!(config.get_by_path("mail/smtp/port", Value::Null), Value::from(587));
//! assert_eq!(config.get_array("tags", Value::Null).as_list().map(Vec::len), Some(2));
//! # Ok::<(), propbag::Error>(())
//! ```

use std::path::Path;

use crate::{
    Result, loader,
    merge::{self, merge_maps, merge_values, unique_by, unique_by_identity},
    path::{self, DEFAULT_SEPARATOR, IntoKeyPath, PathError},
    value::{Equality, Map, Value},
};

/// A mutable holder of one root map.
///
/// Every operation is deterministic given the same root and arguments.
/// `set` and `remove` are idempotent, and the de-duplicating list operations
/// are idempotent once the target already holds their result.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    data: Map,
    separator: char,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            data: Map::new(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection owning `data`.
    pub fn from_map(data: Map) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Parses a JSON document, optionally descending into the top-level `root` key.
    ///
    /// Invalid input yields an empty collection.
    pub fn from_json_str(text: &str, root: Option<&str>) -> Self {
        Self::from_map(loader::load_json_str(text, root))
    }

    /// Loads a JSON file, optionally descending into the top-level `root` key.
    ///
    /// An unreadable or invalid file yields an empty collection.
    pub fn from_file(path: impl AsRef<Path>, root: Option<&str>) -> Self {
        Self::from_map(loader::load_json_file(path, root))
    }

    /// Sets the separator used to split text paths.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Returns the separator used to split text paths.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Replaces the whole root.
    pub fn with_data(&mut self, data: Map) -> &mut Self {
        self.data = data;
        self
    }

    /// Returns true if `key` exists at the top level, even when it holds null.
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Gets the top-level value at `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets the value at `key`, or `default` when it is missing or null.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.data.get(key) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default.into(),
        }
    }

    /// Sets the top-level value at `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Removes `key`, returning its value. Order of the remaining keys is kept.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Returns true if `key` is absent or holds an empty-like value.
    ///
    /// See [`Value::is_empty_like`].
    pub fn is_empty_at(&self, key: &str) -> bool {
        self.data.get(key).is_none_or(Value::is_empty_like)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the root has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over top-level entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Iterates over top-level keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.data.keys()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the entries named in `keys`; no keys selects everything.
    pub fn slice<S: AsRef<str>>(&self, keys: &[S]) -> Map {
        merge::slice_by_keys(&self.data, keys)
    }

    /// Returns the container at `key` as its own collection.
    ///
    /// Lists become index-keyed maps; anything else yields an empty collection.
    pub fn get_collection(&self, key: &str) -> Collection {
        let data = match self.data.get(key) {
            Some(Value::Map(map)) => map.clone(),
            Some(Value::List(list)) => list
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value.clone()))
                .collect(),
            _ => Map::new(),
        };
        Self {
            data,
            separator: self.separator,
        }
    }

    // ===== TYPED GETTERS =====

    /// Gets `key` coerced to a boolean, or `default` when missing or null.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.data.get(key) {
            Some(value) if !value.is_null() => value.to_bool(),
            _ => default,
        }
    }

    /// Gets `key` as text, or `default` when the text is blank after trimming.
    ///
    /// The returned text itself is not trimmed.
    pub fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
        let text = self.get_or(key, default).to_text();
        if text.trim().is_empty() {
            return default.map(str::to_string);
        }
        Some(text)
    }

    /// Gets `key` as an integer.
    ///
    /// Returns `default` when the raw value is empty-like, which includes a
    /// stored `0` and `"0"`, or when it is not numeric.
    pub fn get_int(&self, key: &str, default: Option<i64>) -> Option<i64> {
        match self.data.get(key) {
            Some(value) if !value.is_empty_like() => value.to_int().or(default),
            _ => default,
        }
    }

    /// Gets `key` as a float.
    ///
    /// Returns `default` when the raw value is empty-like, which includes a
    /// stored `0` and `"0"`, or when it is not numeric.
    pub fn get_float(&self, key: &str, default: Option<f64>) -> Option<f64> {
        match self.data.get(key) {
            Some(value) if !value.is_empty_like() => value.to_float().or(default),
            _ => default,
        }
    }

    /// Gets `key` (or `default`) when it is a list or map, otherwise an empty list.
    pub fn get_array(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.get_or(key, default) {
            value if value.is_branch() => value,
            _ => Value::List(Vec::new()),
        }
    }

    // ===== PATH ACCESS =====

    /// Resolves `path`, returning `default` when it is absent or null.
    ///
    /// Text paths are split with this collection's separator.
    pub fn get_by_path(&self, path: impl IntoKeyPath, default: impl Into<Value>) -> Value {
        match self.get_at_path(path) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default.into(),
        }
    }

    /// Resolves `path` without a default.
    pub fn get_at_path(&self, path: impl IntoKeyPath) -> Option<&Value> {
        path::get_with(&self.data, path, self.separator)
    }

    /// Sets `value` at `path`, creating intermediate maps.
    ///
    /// Returns the previous value at the final segment.
    ///
    /// # Errors
    ///
    /// A [`PathError`] when an intermediate segment holds a scalar; the
    /// collection is left unchanged.
    pub fn set_value_at_path(
        &mut self,
        path: impl IntoKeyPath,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        Ok(path::set_with(&mut self.data, path, value, self.separator)?)
    }

    /// Sets a boolean at `path`, coercing `value` first.
    ///
    /// Numbers and numeric text are true when their integer part is positive,
    /// other text is true only when it is exactly `"true"`.
    pub fn set_boolean_value(
        &mut self,
        path: impl IntoKeyPath,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        let flag = match &value {
            Value::Int(_) | Value::Float(_) => value.to_int().unwrap_or(0) > 0,
            Value::Text(text) => match value.to_float() {
                Some(_) => value.to_int().unwrap_or(0) > 0,
                None => text == "true",
            },
            other => other.to_bool(),
        };
        self.set_value_at_path(path, flag)?;
        Ok(())
    }

    // ===== BATCH MUTATION =====

    /// Adds entries from `data` whose keys are absent; current values win.
    pub fn union(&mut self, data: Map) -> &mut Self {
        for (key, value) in data {
            self.data.entry(key).or_insert(value);
        }
        self
    }

    /// Overwrites entries with those from `data`; keys only present here are kept.
    pub fn replace(&mut self, data: Map) -> &mut Self {
        self.data.extend(data);
        self
    }

    /// Merges `data` into the container at `key`, creating it when missing.
    ///
    /// With `recursive == false` map keys are overwritten shallowly; with
    /// `recursive == true` maps are deep merged. Lists are concatenated. See
    /// [`merge_values`].
    pub fn merge_at(&mut self, key: impl Into<String>, data: impl Into<Value>, recursive: bool) {
        let slot = self
            .data
            .entry(key.into())
            .or_insert_with(|| Value::List(Vec::new()));
        let base = std::mem::take(slot);
        *slot = merge_values(base, data.into(), recursive);
    }

    /// Merges `data` into the whole root, shallow or deep.
    pub fn merge_all(&mut self, data: Map, recursive: bool) {
        let base = std::mem::take(&mut self.data);
        self.data = merge_maps(base, &data, recursive);
    }

    /// Appends `value` to the list at `key`, then removes identical entries.
    ///
    /// A missing or null entry becomes an empty list; any other non-list value
    /// is wrapped into a one-element list first.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let slot = self.data.entry(key.into()).or_insert(Value::Null);
        let list = into_sequence(slot);
        list.push(value.into());
        *list = unique_by_identity(std::mem::take(list));
    }

    /// Appends `value` to the list at `key` (or `key`/`sub_key`), then de-duplicates.
    ///
    /// # Errors
    ///
    /// A [`PathError`] when `sub_key` is given and `key` holds a non-map value.
    pub fn push(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        sub_key: Option<&str>,
        equality: Equality,
    ) -> Result<()> {
        let list = self.sequence_mut(key, sub_key)?;
        list.push(value.into());
        *list = unique_by(std::mem::take(list), equality);
        Ok(())
    }

    /// Inserts `value` at the front of the list at `key` (or `key`/`sub_key`),
    /// then de-duplicates keeping first occurrences.
    ///
    /// # Errors
    ///
    /// A [`PathError`] when `sub_key` is given and `key` holds a non-map value.
    pub fn prepend(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        sub_key: Option<&str>,
        equality: Equality,
    ) -> Result<()> {
        let list = self.sequence_mut(key, sub_key)?;
        list.insert(0, value.into());
        *list = unique_by(std::mem::take(list), equality);
        Ok(())
    }

    /// Drops top-level entries holding null or the empty string.
    pub fn remove_empty_items(&mut self) {
        self.data
            .retain(|_, value| !(value.is_null() || value.as_text() == Some("")));
    }

    /// Backfills `value` at `path` inside every top-level map entry lacking it.
    ///
    /// Entries that are not maps are skipped. The update is all-or-nothing: if
    /// any record has a scalar in the way, nothing is written.
    ///
    /// Returns `true` whenever the collection is non-empty.
    pub fn add_field(&mut self, path: impl IntoKeyPath, value: impl Into<Value>) -> Result<bool> {
        let path = path.into_key_path(self.separator);
        let value = value.into();

        let mut data = self.data.clone();
        for (key, item) in data.iter_mut() {
            let Value::Map(record) = item else {
                tracing::trace!(key = %key, "Skipping non-map entry while adding field");
                continue;
            };
            if path::get(record, &path).is_none_or(Value::is_null) {
                path::set(record, &path, value.clone())?;
            }
        }
        self.data = data;

        Ok(!self.data.is_empty())
    }

    // ===== SERIALIZATION =====

    /// Returns the owned root.
    pub fn to_map(&self) -> &Map {
        &self.data
    }

    /// Consumes the collection, returning its root.
    pub fn into_map(self) -> Map {
        self.data
    }

    pub(crate) fn root_mut(&mut self) -> &mut Map {
        &mut self.data
    }

    fn sequence_mut(&mut self, key: &str, sub_key: Option<&str>) -> Result<&mut Vec<Value>> {
        let slot = self.data.entry(key.to_string()).or_insert(Value::Null);
        let Some(sub_key) = sub_key else {
            return Ok(into_sequence(slot));
        };

        if slot.is_null() {
            *slot = Value::Map(Map::new());
        }
        match slot {
            Value::Map(map) => {
                let child = map.entry(sub_key.to_string()).or_insert(Value::Null);
                Ok(into_sequence(child))
            }
            other => Err(PathError::NotAMap {
                path: format!("{key}{}{sub_key}", self.separator),
                segment: sub_key.to_string(),
                found: other.type_name(),
            }
            .into()),
        }
    }
}

/// Turns `slot` into a list in place: null becomes empty, other scalars are wrapped.
fn into_sequence(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_list() {
        let previous = std::mem::take(slot);
        *slot = Value::List(if previous.is_null() {
            Vec::new()
        } else {
            vec![previous]
        });
    }
    match slot {
        Value::List(list) => list,
        _ => unreachable!("slot was just converted to a list"),
    }
}

impl From<Map> for Collection {
    fn from(data: Map) -> Self {
        Self::from_map(data)
    }
}

impl From<Collection> for Map {
    fn from(collection: Collection) -> Self {
        collection.data
    }
}

impl FromIterator<(String, Value)> for Collection {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for Collection {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl serde::Serialize for Collection {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.data, serializer)
    }
}
