//! Typed property descriptors.
//!
//! A [`Property`] describes one configurable field: its name, typed value and
//! default, display title, grouping, and UI hints (required / readonly /
//! hidden / help). Descriptors serialize to a flat [`Map`] with
//! [`Property::to_map`] and are rebuilt with [`Property::from_map`], which is
//! how a [`PropertyRegistry`](crate::PropertyRegistry) stores them.
//!
//! # Building descriptors
//!
//! The `with_*` methods consume and return the descriptor, so a descriptor
//! shared by value is never changed behind its owner's back:
//!
//! ```
//! use propbag::{Property, PropertyType, Value};
//!
//! let port = Property::new("port")
//!     .with_type(PropertyType::Number)
//!     .with_default(25)
//!     .with_title("SMTP port");
//!
//! assert_eq!(port.value(), &Value::from(25));
//! assert_eq!(port.title(), Some("SMTP port"));
//! ```
//!
//! The `set_*` methods mutate in place and return `&mut Self`; they exist for
//! configurator closures that receive a `&mut Property`.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::value::{Map, Value};

mod shorthand;

/// Errors raised while building property descriptors.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A shorthand token had no `=` separator.
    #[error("Malformed property token '{token}' in '{text}': expected key=value")]
    Parse { token: String, text: String },

    /// A type name did not match any [`PropertyType`].
    #[error("Unknown property type '{name}'")]
    UnknownType { name: String },

    /// A property, group or group label used a reserved registry key.
    #[error("Property name '{name}' is reserved")]
    ReservedName { name: String },
}

impl PropertyError {
    /// Check if this error is a shorthand parse failure
    pub fn is_parse_error(&self) -> bool {
        matches!(self, PropertyError::Parse { .. })
    }

    /// Check if this error is an unknown type name
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, PropertyError::UnknownType { .. })
    }

    /// Check if this error is a reserved registry key
    pub fn is_reserved_name(&self) -> bool {
        matches!(self, PropertyError::ReservedName { .. })
    }
}

/// The closed set of property types.
///
/// Each type has a stable numeric id (its position, `0..=9`) used in the
/// serialized form, and a canonical lowercase name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PropertyType {
    #[default]
    Text,
    Number,
    Custom,
    Boolean,
    List,
    ClassRef,
    Password,
    Url,
    TextArea,
    Group,
}

impl PropertyType {
    /// Every type, in id order.
    pub const ALL: [PropertyType; 10] = [
        PropertyType::Text,
        PropertyType::Number,
        PropertyType::Custom,
        PropertyType::Boolean,
        PropertyType::List,
        PropertyType::ClassRef,
        PropertyType::Password,
        PropertyType::Url,
        PropertyType::TextArea,
        PropertyType::Group,
    ];

    /// Maps a canonical type name to its type.
    ///
    /// ```
    /// # use propbag::PropertyType;
    /// assert_eq!(PropertyType::from_name("text-area"), Some(PropertyType::TextArea));
    /// assert_eq!(PropertyType::from_name("class"), Some(PropertyType::ClassRef));
    /// assert_eq!(PropertyType::from_name("Text"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns the canonical name.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Number => "number",
            PropertyType::Custom => "custom",
            PropertyType::Boolean => "boolean",
            PropertyType::List => "list",
            PropertyType::ClassRef => "class",
            PropertyType::Password => "password",
            PropertyType::Url => "url",
            PropertyType::TextArea => "text-area",
            PropertyType::Group => "group",
        }
    }

    /// Returns the numeric id used in serialized descriptors.
    pub fn id(self) -> i64 {
        self as i64
    }

    /// Maps a numeric id back to its type.
    pub fn from_id(id: i64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Reads a type from a serialized value: an id, a name, or numeric text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(id) => Self::from_id(*id),
            Value::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PropertyType {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_name(trimmed)
            .or_else(|| trimmed.parse::<i64>().ok().and_then(Self::from_id))
            .ok_or_else(|| PropertyError::UnknownType {
                name: s.to_string(),
            })
    }
}

/// A single named, typed field.
///
/// Unset values are [`Value::Null`]; unset text fields are `None`; unset flags
/// read as `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    name: Option<String>,
    value: Value,
    default: Value,
    kind: PropertyType,
    title: Option<String>,
    description: Option<String>,
    required: Option<bool>,
    readonly: Option<bool>,
    hidden: Option<bool>,
    help: Option<String>,
    items: Vec<Value>,
    group: Option<String>,
}

impl Property {
    /// Creates an empty text descriptor named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builds a descriptor from its serialized form.
    ///
    /// `type` may be a numeric id or a type name; anything unrecognised falls
    /// back to [`PropertyType::Text`]. Flags are coerced with
    /// [`Value::to_bool`]. `items` is only read from a list.
    pub fn from_map(map: &Map) -> Self {
        let kind = match map.get("type") {
            None | Some(Value::Null) => PropertyType::Text,
            Some(raw) => PropertyType::from_value(raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown property type, using text");
                PropertyType::Text
            }),
        };
        let flag = |key: &str| map.get(key).filter(|v| !v.is_null()).map(Value::to_bool);

        Self {
            name: text_field(map, "name"),
            value: map.get("value").cloned().unwrap_or_default(),
            default: map.get("default").cloned().unwrap_or_default(),
            kind,
            title: text_field(map, "title"),
            description: text_field(map, "description"),
            required: flag("required"),
            readonly: flag("readonly"),
            hidden: flag("hidden"),
            help: text_field(map, "help"),
            items: match map.get("items") {
                Some(Value::List(items)) => items.clone(),
                _ => Vec::new(),
            },
            group: text_field(map, "group"),
        }
    }

    /// Parses `key=value|key=value` shorthand and builds a descriptor from it.
    ///
    /// ```
    /// # use propbag::{Property, PropertyType};
    /// let property = Property::from_shorthand("name=Color|type=text|required=true")?;
    /// assert_eq!(property.name(), Some("Color"));
    /// assert_eq!(property.kind(), PropertyType::Text);
    /// assert!(property.is_required());
    ///
    /// assert!(Property::from_shorthand("name").is_err());
    /// # Ok::<(), propbag::PropertyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`PropertyError::Parse`] when a token has no `=`.
    pub fn from_shorthand(text: &str) -> Result<Self, PropertyError> {
        let map = shorthand::parse(text)?;
        Ok(Self::from_map(&map))
    }

    /// Serializes every field.
    ///
    /// `value` and `title` are written with their fallbacks applied, `type` as
    /// its numeric id, and unset flags as `false`.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(self.name.as_deref()));
        map.insert("value".to_string(), self.value().clone());
        map.insert("title".to_string(), Value::from(self.title()));
        map.insert(
            "description".to_string(),
            Value::from(self.description.as_deref()),
        );
        map.insert("default".to_string(), self.default.clone());
        map.insert("type".to_string(), Value::Int(self.kind.id()));
        map.insert("required".to_string(), Value::Bool(self.is_required()));
        map.insert("readonly".to_string(), Value::Bool(self.is_readonly()));
        map.insert("hidden".to_string(), Value::Bool(self.is_hidden()));
        map.insert("items".to_string(), Value::List(self.items.clone()));
        map.insert("group".to_string(), Value::from(self.group.as_deref()));
        map.insert("help".to_string(), Value::from(self.help.as_deref()));
        map
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the value, or the default when the value is unset.
    pub fn value(&self) -> &Value {
        if self.value.is_null() {
            &self.default
        } else {
            &self.value
        }
    }

    /// Returns the value without the default fallback.
    pub fn raw_value(&self) -> &Value {
        &self.value
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn kind(&self) -> PropertyType {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns the title, or the name when the title is unset or empty.
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .or(self.name.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.unwrap_or(false)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    /// Returns true for [`PropertyType::Group`] descriptors.
    pub fn is_group(&self) -> bool {
        self.kind == PropertyType::Group
    }

    // ===== CONSUMING BUILDER =====

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.set_default(default);
        self
    }

    pub fn with_type(mut self, kind: PropertyType) -> Self {
        self.set_type(kind);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.set_title(title);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.set_required(required);
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.set_readonly(readonly);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.set_hidden(hidden);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.set_help(help);
        self
    }

    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.set_items(items);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.set_group(group);
        self
    }

    // ===== IN-PLACE MUTATORS =====

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = value.into();
        self
    }

    pub fn set_default(&mut self, default: impl Into<Value>) -> &mut Self {
        self.default = default.into();
        self
    }

    pub fn set_type(&mut self, kind: PropertyType) -> &mut Self {
        self.kind = kind;
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = Some(required);
        self
    }

    pub fn set_readonly(&mut self, readonly: bool) -> &mut Self {
        self.readonly = Some(readonly);
        self
    }

    pub fn set_hidden(&mut self, hidden: bool) -> &mut Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn set_help(&mut self, help: impl Into<String>) -> &mut Self {
        self.help = Some(help.into());
        self
    }

    pub fn set_items(&mut self, items: Vec<Value>) -> &mut Self {
        self.items = items;
        self
    }

    pub fn set_group(&mut self, group: impl Into<String>) -> &mut Self {
        self.group = Some(group.into());
        self
    }
}

/// Reads an optional text field; scalars are rendered as text, containers ignored.
fn text_field(map: &Map, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null | Value::List(_) | Value::Map(_) => None,
        Value::Text(text) => Some(text.clone()),
        other => Some(other.to_text()),
    }
}

impl From<&Property> for Value {
    fn from(property: &Property) -> Self {
        Value::Map(property.to_map())
    }
}

impl From<Property> for Value {
    fn from(property: Property) -> Self {
        Value::Map(property.to_map())
    }
}

impl Serialize for Property {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_map().serialize(serializer)
    }
}
