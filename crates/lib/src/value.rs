//! Value types for nested collections.
//!
//! This module provides the [`Value`] enum that represents every node that can
//! live inside a [`Collection`](crate::Collection): scalars (null, booleans,
//! numbers, text) and branches (ordered lists and ordered string-keyed maps).
//!
//! Values serialize to and from plain JSON, so data produced by external
//! loaders can be handed to a collection without conversion.

use std::{collections::BTreeMap, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered, string-keyed mapping of [`Value`]s.
///
/// Insertion order is preserved, which keeps serialized output stable and makes
/// index-like keys (`"0"`, `"1"`, ...) meaningful for [`is_associative`](crate::merge::is_associative).
pub type Map = IndexMap<String, Value>;

/// A node in a nested collection.
///
/// # Value Types
///
/// ## Leaf Values
/// - [`Value::Null`] - absent / unset
/// - [`Value::Bool`] - boolean flag
/// - [`Value::Int`] - 64-bit signed integer
/// - [`Value::Float`] - 64-bit float
/// - [`Value::Text`] - UTF-8 text
///
/// ## Branch Values
/// - [`Value::List`] - ordered sequence of values
/// - [`Value::Map`] - ordered mapping of string keys to values
///
/// # Direct Comparisons
///
/// `Value` implements `PartialEq` with primitive types:
///
/// ```
/// # use propbag::Value;
/// assert!(Value::from("hello") == "hello");
/// assert!(Value::from(42) == 42);
/// assert!(Value::from(true) == true);
/// assert!(!(Value::from("42") == 42));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    // Leaf values
    /// Null / unset value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text string value
    Text(String),

    // Branch values
    /// Ordered sequence of values
    List(Vec<Value>),
    /// Nested mapping
    Map(Map),
}

/// Equality policy used when de-duplicating sequences.
///
/// - [`Equality::Canonical`]: two values are equal iff their key-sorted JSON
///   renderings are identical (`1` and `"1"` differ, maps compare structurally
///   regardless of key order).
/// - [`Equality::Loose`]: numbers and numeric text compare by numeric value,
///   booleans compare by truthiness, containers compare element-wise with the
///   same loose rule.
///
/// ```
/// # use propbag::{Equality, Value};
/// let one = Value::from(1);
/// let text = Value::from("1");
/// assert!(!Equality::Canonical.equal(&one, &text));
/// assert!(Equality::Loose.equal(&one, &text));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Equality {
    /// Compare canonical serialized forms.
    #[default]
    Canonical,
    /// Compare by loosely coerced value.
    Loose,
}

impl Equality {
    /// Returns true if `a` and `b` are equal under this policy.
    pub fn equal(self, a: &Value, b: &Value) -> bool {
        match self {
            Equality::Canonical => a.identity() == b.identity(),
            Equality::Loose => a.loosely_equals(b),
        }
    }
}

impl Value {
    /// Returns true if this is a leaf value
    pub fn is_leaf(&self) -> bool {
        !self.is_branch()
    }

    /// Returns true if this is a list or a map
    pub fn is_branch(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Returns true if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is a map
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns true if this is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns true for integers and floats
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns true if the value counts as empty.
    ///
    /// Empty values are `null`, `false`, `0`, `0.0`, `""`, `"0"`, and empty
    /// lists or maps. Note that a literal zero is empty, so typed getters that
    /// honour this rule return their default for a stored `0`.
    pub fn is_empty_like(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty() || s == "0",
            Value::List(list) => list.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Attempts to convert to a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to convert to an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a float; integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to convert to a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to convert to a list
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Attempts to convert to a mutable list
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Attempts to convert to a map
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to convert to a mutable map
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Coerces the value to a boolean.
    ///
    /// Numbers (and numeric text) are true when greater than zero, other text is
    /// true only when it reads `true` (case-insensitive), containers are true
    /// when non-empty.
    ///
    /// ```
    /// # use propbag::Value;
    /// assert!(Value::from("true").to_bool());
    /// assert!(Value::from("1").to_bool());
    /// assert!(!Value::from("yes").to_bool());
    /// assert!(!Value::from(0).to_bool());
    /// ```
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n > 0,
            Value::Float(f) => *f > 0.0,
            Value::Text(s) => match parse_number(s) {
                Some(n) => n > 0.0,
                None => s.trim().eq_ignore_ascii_case("true"),
            },
            Value::List(list) => !list.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Coerces the value to an integer, truncating floats and parsing numeric text.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(f.trunc() as i64),
            Value::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| parse_number(trimmed).map(|f| f.trunc() as i64))
            }
            _ => None,
        }
    }

    /// Coerces the value to a float, parsing numeric text.
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Renders the value as plain text.
    ///
    /// Null renders as the empty string, text is returned verbatim and
    /// containers render as their canonical JSON form.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::List(_) | Value::Map(_) => self.canonical(),
        }
    }

    /// Returns the canonical serialized form, keeping map insertion order.
    pub fn canonical(&self) -> String {
        // Serializing a Value cannot fail: keys are strings and non-finite floats render as null.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Returns the serialized form used for identity comparisons.
    ///
    /// Map keys are sorted at every level, so maps holding the same entries
    /// in a different order share one identity.
    ///
    /// ```
    /// # use propbag::Value;
    /// let a: Value = serde_json::from_str(r#"{"a":1,"b":{"y":2,"x":1}}"#).unwrap();
    /// let b: Value = serde_json::from_str(r#"{"b":{"x":1,"y":2},"a":1}"#).unwrap();
    /// assert_ne!(a.canonical(), b.canonical());
    /// assert_eq!(a.identity(), b.identity());
    /// ```
    pub fn identity(&self) -> String {
        serde_json::to_string(&SortedKeys(self)).unwrap_or_default()
    }

    /// Compares two values with loose coercion rules.
    ///
    /// See [`Equality::Loose`].
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, v) | (v, Value::Null) => v.is_empty_like(),
            (Value::Bool(a), v) | (v, Value::Bool(a)) => *a == v.to_bool(),
            (Value::Text(a), Value::Text(b)) => match (parse_number(a), parse_number(b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.loosely_equals(y)))
            }
            (a, b) if a.is_branch() || b.is_branch() => false,
            (a, b) => match (a.to_float(), b.to_float()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

/// Parses numeric text, rejecting the `inf`/`nan` spellings `f64::from_str` accepts.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Serializes a value with map keys in sorted order.
struct SortedKeys<'a>(&'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Value::List(items) => serializer.collect_seq(items.iter().map(SortedKeys)),
            Value::Map(map) => {
                let sorted: BTreeMap<&String, &Value> = map.iter().collect();
                serializer.collect_map(
                    sorted
                        .into_iter()
                        .map(|(key, value)| (key, SortedKeys(value))),
                )
            }
            leaf => leaf.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            Value::Float(f) => serde_json::Value::from(f),
            Value::Text(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

// PartialEq implementations for comparing Value with other types
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::Text(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(n) if n == other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        matches!(self, Value::Int(n) if *n == *other as i64)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Float(f) if f == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(b) if b == other)
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == *self
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for bool {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}
