//! Path addressing for nested collections.
//!
//! A [`KeyPath`] is an ordered list of string segments that addresses a value
//! inside a root [`Map`]. Paths are usually written as text split on a
//! separator (`/` by default) but may also be supplied pre-split.
//!
//! # Usage
//!
//! ```rust
//! use propbag::{Map, Value, path};
//!
//! let mut root = Map::new();
//! path::set(&mut root, "user/profile/name", "Alice")?;
//!
//! assert_eq!(path::get(&root, "user/profile/name"), Some(&Value::from("Alice")));
//! assert_eq!(path::get(&root, ["user", "profile", "name"]), Some(&Value::from("Alice")));
//! assert_eq!(path::get(&root, "user/missing"), None);
//! # Ok::<(), propbag::path::PathError>(())
//! ```
//!
//! Reads never create intermediate nodes. Writes create missing (or null)
//! intermediate maps, but refuse to descend through scalars.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::value::{Map, Value};

/// Default path separator.
pub const DEFAULT_SEPARATOR: char = '/';

/// Error type for structural path failures.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// An intermediate segment holds a value that cannot be descended into.
    #[error("Cannot descend into {found} at segment '{segment}' of path '{path}'")]
    NotAMap {
        path: String,
        segment: String,
        found: &'static str,
    },

    /// A list was addressed with a non-numeric or out-of-range index.
    #[error("Invalid list index '{segment}' in path '{path}' (list has {len} items)")]
    IndexOutOfBounds {
        path: String,
        segment: String,
        len: usize,
    },
}

impl PathError {
    /// Get the full path of the failed operation
    pub fn path(&self) -> &str {
        match self {
            PathError::NotAMap { path, .. } | PathError::IndexOutOfBounds { path, .. } => path,
        }
    }

    /// Get the segment at which traversal failed
    pub fn segment(&self) -> &str {
        match self {
            PathError::NotAMap { segment, .. } | PathError::IndexOutOfBounds { segment, .. } => {
                segment
            }
        }
    }
}

/// An owned path made of string segments.
///
/// Segments are kept exactly as split: `"a//b"` has three segments, the middle
/// one empty. The empty string is the empty path.
///
/// ```rust
/// # use propbag::path::KeyPath;
/// let path = KeyPath::parse("config.mail.host", '.');
/// assert_eq!(path.segments().collect::<Vec<_>>(), vec!["config", "mail", "host"]);
///
/// let built = KeyPath::new().push("config").push("mail");
/// assert_eq!(built.to_string(), "config/mail");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `text` on `separator`.
    pub fn parse(text: &str, separator: char) -> Self {
        if text.is_empty() {
            return Self::new();
        }
        Self {
            segments: text.split(separator).map(str::to_string).collect(),
        }
    }

    /// Builds a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Returns an iterator over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns the segments as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parent path, or `None` for the empty path.
    pub fn parent(&self) -> Option<KeyPath> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Returns the final segment.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Joins the segments with `separator`.
    pub fn join_with(&self, separator: char) -> String {
        let mut buf = [0u8; 4];
        self.segments.join(separator.encode_utf8(&mut buf))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join_with(DEFAULT_SEPARATOR))
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_SEPARATOR))
    }
}

/// Conversion into a [`KeyPath`], splitting text with a caller-chosen separator.
///
/// Text inputs are split; already segmented inputs ignore the separator.
pub trait IntoKeyPath {
    /// Converts `self` into a path, splitting text on `separator`.
    fn into_key_path(self, separator: char) -> KeyPath;
}

impl IntoKeyPath for KeyPath {
    fn into_key_path(self, _separator: char) -> KeyPath {
        self
    }
}

impl IntoKeyPath for &KeyPath {
    fn into_key_path(self, _separator: char) -> KeyPath {
        self.clone()
    }
}

impl IntoKeyPath for &str {
    fn into_key_path(self, separator: char) -> KeyPath {
        KeyPath::parse(self, separator)
    }
}

impl IntoKeyPath for String {
    fn into_key_path(self, separator: char) -> KeyPath {
        KeyPath::parse(&self, separator)
    }
}

impl IntoKeyPath for &String {
    fn into_key_path(self, separator: char) -> KeyPath {
        KeyPath::parse(self, separator)
    }
}

impl IntoKeyPath for Vec<String> {
    fn into_key_path(self, _separator: char) -> KeyPath {
        KeyPath { segments: self }
    }
}

impl IntoKeyPath for Vec<&str> {
    fn into_key_path(self, _separator: char) -> KeyPath {
        KeyPath::from_segments(self)
    }
}

impl IntoKeyPath for &[&str] {
    fn into_key_path(self, _separator: char) -> KeyPath {
        KeyPath::from_segments(self.iter().copied())
    }
}

impl<const N: usize> IntoKeyPath for [&str; N] {
    fn into_key_path(self, _separator: char) -> KeyPath {
        KeyPath::from_segments(self)
    }
}

/// Resolves `path` inside `root`, splitting text paths on `/`.
///
/// Returns `None` the first time a segment is missing or the current node
/// cannot be descended into. Lists are addressed by numeric segments.
pub fn get(root: &Map, path: impl IntoKeyPath) -> Option<&Value> {
    get_with(root, path, DEFAULT_SEPARATOR)
}

/// Like [`get`], splitting text paths on `separator`.
pub fn get_with(root: &Map, path: impl IntoKeyPath, separator: char) -> Option<&Value> {
    let path = path.into_key_path(separator);
    let (first, rest) = path.as_slice().split_first()?;

    let mut current = root.get(first)?;
    for segment in rest {
        current = match current {
            Value::Map(map) => map.get(segment)?,
            Value::List(list) => list.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get_with`].
pub fn get_mut_with(root: &mut Map, path: impl IntoKeyPath, separator: char) -> Option<&mut Value> {
    let path = path.into_key_path(separator);
    let (first, rest) = path.as_slice().split_first()?;

    let mut current = root.get_mut(first)?;
    for segment in rest {
        current = match current {
            Value::Map(map) => map.get_mut(segment)?,
            Value::List(list) => list.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`].
pub fn get_mut(root: &mut Map, path: impl IntoKeyPath) -> Option<&mut Value> {
    get_mut_with(root, path, DEFAULT_SEPARATOR)
}

/// Sets `value` at `path`, splitting text paths on `/`.
///
/// See [`set_with`].
pub fn set(
    root: &mut Map,
    path: impl IntoKeyPath,
    value: impl Into<Value>,
) -> Result<Option<Value>, PathError> {
    set_with(root, path, value, DEFAULT_SEPARATOR)
}

/// Sets `value` at `path`, creating intermediate maps as needed.
///
/// Returns the value previously stored at the final segment. Missing or null
/// intermediate segments become empty maps; lists are descended by in-range
/// numeric index. An empty path is a no-op returning `Ok(None)`.
///
/// # Errors
///
/// [`PathError::NotAMap`] when an intermediate segment holds a scalar and
/// [`PathError::IndexOutOfBounds`] for a bad list index. The root is left
/// untouched on error.
pub fn set_with(
    root: &mut Map,
    path: impl IntoKeyPath,
    value: impl Into<Value>,
    separator: char,
) -> Result<Option<Value>, PathError> {
    let path = path.into_key_path(separator);
    let Some((first, rest)) = path.as_slice().split_first() else {
        tracing::trace!("Ignoring write to empty path");
        return Ok(None);
    };

    check_writable(root.get(first), rest, &path)?;

    if rest.is_empty() {
        return Ok(root.insert(first.clone(), value.into()));
    }
    let child = root.entry(first.clone()).or_insert(Value::Null);
    set_in(child, rest, value.into(), &path)
}

/// Removes the value at `path`, returning it.
pub fn remove(root: &mut Map, path: impl IntoKeyPath) -> Option<Value> {
    let path = path.into_key_path(DEFAULT_SEPARATOR);
    let parent = path.parent()?;
    let last = path.last()?;

    if parent.is_empty() {
        return root.shift_remove(last);
    }
    match get_mut(root, parent)? {
        Value::Map(map) => map.shift_remove(last),
        Value::List(list) => {
            let index = last.parse::<usize>().ok().filter(|i| *i < list.len())?;
            Some(list.remove(index))
        }
        _ => None,
    }
}

/// Walks the intermediate segments read-only so a failing write never leaves
/// half-built maps behind.
fn check_writable(
    mut current: Option<&Value>,
    segments: &[String],
    path: &KeyPath,
) -> Result<(), PathError> {
    for segment in segments {
        current = match current {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Map(map)) => map.get(segment),
            Some(Value::List(list)) => Some(&list[list_index(list, segment, path)?]),
            Some(other) => {
                return Err(PathError::NotAMap {
                    path: path.to_string(),
                    segment: segment.clone(),
                    found: other.type_name(),
                });
            }
        };
    }
    Ok(())
}

fn set_in(
    node: &mut Value,
    segments: &[String],
    value: Value,
    path: &KeyPath,
) -> Result<Option<Value>, PathError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Some(std::mem::replace(node, value)));
    };

    if node.is_null() {
        *node = Value::Map(Map::new());
    }

    match node {
        Value::Map(map) => {
            if rest.is_empty() {
                return Ok(map.insert(segment.clone(), value));
            }
            let child = map.entry(segment.clone()).or_insert(Value::Null);
            set_in(child, rest, value, path)
        }
        Value::List(list) => {
            let index = list_index(list, segment, path)?;
            set_in(&mut list[index], rest, value, path)
        }
        other => Err(PathError::NotAMap {
            path: path.to_string(),
            segment: segment.clone(),
            found: other.type_name(),
        }),
    }
}

fn list_index(list: &[Value], segment: &str, path: &KeyPath) -> Result<usize, PathError> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index < list.len())
        .ok_or_else(|| PathError::IndexOutOfBounds {
            path: path.to_string(),
            segment: segment.to_string(),
            len: list.len(),
        })
}
