//! Recursive merge and structural helpers for nested maps.
//!
//! All functions here are pure: they take their inputs by value or reference
//! and return new values, leaving borrowed inputs untouched.
//!
//! The merge family differs only in how collisions are resolved:
//!
//! | function        | Map / Map      | List / List            | other collision |
//! |-----------------|----------------|------------------------|-----------------|
//! | [`deep_insert`] | recurse        | right wins             | right wins      |
//! | [`deep_merge`]  | recurse        | right wins             | right wins      |
//! | [`append`]      | right wins     | de-duplicated union    | right wins      |
//! | [`merge_values`]| shallow / deep | concatenate            | right wins      |

use crate::value::{Equality, Map, Value};

/// Counts leaves: a container counts the sum of its children, anything else 1.
///
/// ```
/// # use propbag::{Value, merge::recursive_count};
/// let value: Value = serde_json::from_str(r#"{"a":1,"b":{"c":2,"d":[3,4]},"e":{}}"#).unwrap();
/// assert_eq!(recursive_count(&value), 4);
/// assert_eq!(recursive_count(&Value::from("x")), 1);
/// ```
pub fn recursive_count(value: &Value) -> usize {
    match value {
        Value::Map(map) => map.values().map(recursive_count).sum(),
        Value::List(list) => list.iter().map(recursive_count).sum(),
        _ => 1,
    }
}

/// Inserts `insert` into `base`, recursing where both sides hold a map.
///
/// Keys only present in `base` are preserved; on any other collision the
/// inserted value wins.
pub fn deep_insert(mut base: Map, insert: &Map) -> Map {
    for (key, value) in insert {
        match (base.get_mut(key), value) {
            (Some(Value::Map(existing)), Value::Map(incoming)) => {
                let merged = deep_insert(std::mem::take(existing), incoming);
                *existing = merged;
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
    base
}

/// Appends `to_append` into `base`.
///
/// Where both sides hold a list the result is their de-duplicated union, base
/// order first. Every other value in `to_append` overwrites.
pub fn append(mut base: Map, to_append: &Map) -> Map {
    for (key, value) in to_append {
        let merged = match (base.get(key), value) {
            (Some(Value::List(existing)), Value::List(incoming)) => {
                let combined = existing.iter().chain(incoming).cloned().collect();
                Value::List(unique_by_identity(combined))
            }
            (_, Value::List(incoming)) => Value::List(unique_by_identity(incoming.clone())),
            _ => value.clone(),
        };
        base.insert(key.clone(), merged);
    }
    base
}

/// Deep merges `b` into `a`.
///
/// Shared keys holding maps on both sides are merged recursively; any other
/// collision is won by `b`.
///
/// ```
/// # use propbag::{Value, merge::deep_merge};
/// let a: Value = serde_json::from_str(r#"{"a":{"x":1,"y":2}}"#).unwrap();
/// let b: Value = serde_json::from_str(r#"{"a":{"y":3,"z":4}}"#).unwrap();
/// let merged = deep_merge(a.as_map().unwrap(), b.as_map().unwrap());
/// assert_eq!(Value::Map(merged).canonical(), r#"{"a":{"x":1,"y":3,"z":4}}"#);
/// ```
pub fn deep_merge(a: &Map, b: &Map) -> Map {
    let mut result = a.clone();
    for (key, value) in b {
        let merged = match (result.get(key), value) {
            (Some(Value::Map(left)), Value::Map(right)) => Value::Map(deep_merge(left, right)),
            _ => value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Merges two arbitrary values the way collection-level merges expect.
///
/// - list + list: concatenation
/// - map + map: shallow right-wins, or [`deep_merge`] when `recursive`
/// - list + map (either order): the list is treated as a map keyed by index
/// - anything else: `incoming` replaces `base`
pub fn merge_values(base: Value, incoming: Value, recursive: bool) -> Value {
    match (base, incoming) {
        (Value::List(mut left), Value::List(right)) => {
            left.extend(right);
            Value::List(left)
        }
        (Value::Map(left), Value::Map(right)) => Value::Map(merge_maps(left, &right, recursive)),
        (Value::List(left), Value::Map(right)) => {
            Value::Map(merge_maps(index_keyed(left), &right, recursive))
        }
        (Value::Map(left), Value::List(right)) => {
            Value::Map(merge_maps(left, &index_keyed(right), recursive))
        }
        (_, incoming) => incoming,
    }
}

/// Shallow right-wins merge, or [`deep_merge`] when `recursive`.
pub fn merge_maps(base: Map, incoming: &Map, recursive: bool) -> Map {
    if recursive {
        return deep_merge(&base, incoming);
    }
    let mut result = base;
    for (key, value) in incoming {
        result.insert(key.clone(), value.clone());
    }
    result
}

fn index_keyed(list: Vec<Value>) -> Map {
    list.into_iter()
        .enumerate()
        .map(|(index, value)| (index.to_string(), value))
        .collect()
}

/// Removes entries whose [identity](Value::identity) repeats an earlier entry.
///
/// Maps holding the same entries in a different order count as duplicates.
pub fn unique_by_identity(items: Vec<Value>) -> Vec<Value> {
    unique_by(items, Equality::Canonical)
}

/// Removes entries equal (under `equality`) to an earlier entry, keeping the
/// first occurrence.
pub fn unique_by(items: Vec<Value>, equality: Equality) -> Vec<Value> {
    match equality {
        Equality::Canonical => {
            let mut seen = std::collections::HashSet::new();
            items
                .into_iter()
                .filter(|item| seen.insert(item.identity()))
                .collect()
        }
        Equality::Loose => {
            let mut result: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !result.iter().any(|kept| kept.loosely_equals(&item)) {
                    result.push(item);
                }
            }
            result
        }
    }
}

/// Returns true if `value` is a map whose keys are not exactly `"0".."n-1"` in order.
///
/// Lists, empty maps and scalars are never associative.
///
/// ```
/// # use propbag::{Value, merge::is_associative};
/// let list: Value = serde_json::from_str("[10,20,30]").unwrap();
/// let map: Value = serde_json::from_str(r#"{"a":1}"#).unwrap();
/// let indexed: Value = serde_json::from_str(r#"{"0":"x","1":"y"}"#).unwrap();
/// assert!(!is_associative(&Value::List(vec![])));
/// assert!(!is_associative(&list));
/// assert!(!is_associative(&indexed));
/// assert!(is_associative(&map));
/// ```
pub fn is_associative(value: &Value) -> bool {
    match value {
        Value::Map(map) if !map.is_empty() => map
            .keys()
            .enumerate()
            .any(|(index, key)| *key != index.to_string()),
        _ => false,
    }
}

/// Returns true if any direct child of `value` is a container.
pub fn has_sub_items(value: &Value) -> bool {
    match value {
        Value::Map(map) => map.values().any(Value::is_branch),
        Value::List(list) => list.iter().any(Value::is_branch),
        _ => false,
    }
}

/// Joins path segments with `/`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits trimmed `text` on `separator` (a newline by default).
///
/// Blank text yields an empty vector.
pub fn split_text(text: &str, separator: Option<&str>) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(separator.unwrap_or("\n"))
        .map(str::to_string)
        .collect()
}

/// Joins the text renderings of `values` with `separator` (a newline by default).
pub fn join_values(values: &[Value], separator: Option<&str>) -> String {
    values
        .iter()
        .map(Value::to_text)
        .collect::<Vec<_>>()
        .join(separator.unwrap_or("\n"))
}

/// Returns the entries whose key starts with `prefix`.
pub fn filter_by_key_prefix(map: &Map, prefix: &str) -> Map {
    map.iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Stores `value` at `key` unless a non-null value is already present.
pub fn set_default(map: &mut Map, key: &str, value: impl Into<Value>) {
    match map.get_mut(key) {
        Some(existing) if !existing.is_null() => {}
        Some(existing) => *existing = value.into(),
        None => {
            map.insert(key.to_string(), value.into());
        }
    }
}

/// Returns the entries named in `keys`, in map order. No keys selects everything.
pub fn slice_by_keys<S: AsRef<str>>(map: &Map, keys: &[S]) -> Map {
    if keys.is_empty() {
        return map.clone();
    }
    map.iter()
        .filter(|(key, _)| keys.iter().any(|wanted| wanted.as_ref() == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Drops every empty-like entry except integer zero.
pub fn remove_empty(map: Map) -> Map {
    map.into_iter()
        .filter(|(_, value)| !value.is_empty_like() || matches!(value, Value::Int(0)))
        .collect()
}

/// Projects each map row onto `keys`; non-map rows become empty maps.
pub fn select_columns<S: AsRef<str>>(rows: &[Value], keys: &[S]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let selected = row
                .as_map()
                .map(|map| {
                    map.iter()
                        .filter(|(key, _)| keys.iter().any(|k| k.as_ref() == key.as_str()))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default();
            Value::Map(selected)
        })
        .collect()
}
