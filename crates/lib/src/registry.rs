//! Registry of serialized property descriptors.
//!
//! A [`PropertyRegistry`] is a [`Collection`] whose top-level values are
//! serialized [`Property`] maps. Grouped descriptors live one level deeper,
//! under their group's key, and the reserved [`GROUPS_KEY`] entry lists the
//! keys that are group namespaces rather than descriptors:
//!
//! ```text
//! {
//!   "enabled": { "name": "enabled", "type": 3, "value": true, ... },
//!   "mail":    { "host": { "name": "host", "group": "mail", ... } },
//!   "groups":  ["mail"]
//! }
//! ```
//!
//! Batch reads and writes ([`get_values`](PropertyRegistry::get_values),
//! [`clear_values`](PropertyRegistry::clear_values),
//! [`set_property_values`](PropertyRegistry::set_property_values)) consult
//! that list to decide whether a key is a descriptor or a namespace.

use std::{fmt, path::Path};

use crate::{
    Result,
    collection::Collection,
    property::{Property, PropertyError, PropertyType},
    value::{Map, Value},
};

/// Top-level key listing group namespaces.
pub const GROUPS_KEY: &str = "groups";

/// The accepted ways of describing a property to [`PropertyRegistry::property`].
pub enum Descriptor {
    /// A flat attribute map, as produced by [`Property::to_map`].
    Attributes(Map),
    /// An already built descriptor.
    Built(Property),
    /// `key=value|key=value` shorthand.
    Shorthand(String),
    /// A closure that configures a fresh descriptor named after the property.
    Configure(Box<dyn FnOnce(&mut Property)>),
}

impl Descriptor {
    /// Wraps a configurator closure.
    ///
    /// ```
    /// # use propbag::{Descriptor, PropertyRegistry, PropertyType};
    /// let mut registry = PropertyRegistry::new();
    /// registry.property(
    ///     "retries",
    ///     Descriptor::configure(|p| {
    ///         p.set_type(PropertyType::Number).set_default(3);
    ///     }),
    /// )?;
    /// assert_eq!(registry.get_type("retries", None), Some(PropertyType::Number));
    /// # Ok::<(), propbag::Error>(())
    /// ```
    pub fn configure(f: impl FnOnce(&mut Property) + 'static) -> Self {
        Descriptor::Configure(Box::new(f))
    }

    /// Turns the descriptor into a concrete property named `name`.
    ///
    /// Descriptors that carry their own name keep it.
    pub fn resolve(self, name: &str) -> std::result::Result<Property, PropertyError> {
        let mut property = match self {
            Descriptor::Attributes(map) => Property::from_map(&map),
            Descriptor::Built(property) => property,
            Descriptor::Shorthand(text) => Property::from_shorthand(&text)?,
            Descriptor::Configure(configure) => {
                let mut property = Property::new(name);
                configure(&mut property);
                property
            }
        };
        if property.name().is_none_or(str::is_empty) {
            property.set_name(name);
        }
        Ok(property)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Attributes(map) => f.debug_tuple("Attributes").field(map).finish(),
            Descriptor::Built(property) => f.debug_tuple("Built").field(property).finish(),
            Descriptor::Shorthand(text) => f.debug_tuple("Shorthand").field(text).finish(),
            Descriptor::Configure(_) => f.write_str("Configure(..)"),
        }
    }
}

impl From<Map> for Descriptor {
    fn from(map: Map) -> Self {
        Descriptor::Attributes(map)
    }
}

impl From<Property> for Descriptor {
    fn from(property: Property) -> Self {
        Descriptor::Built(property)
    }
}

impl From<&str> for Descriptor {
    fn from(text: &str) -> Self {
        Descriptor::Shorthand(text.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(text: String) -> Self {
        Descriptor::Shorthand(text)
    }
}

/// A collection of serialized property descriptors with group support.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyRegistry {
    inner: Collection,
}

impl PropertyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already serialized descriptors.
    pub fn from_map(data: Map) -> Self {
        Self {
            inner: Collection::from_map(data),
        }
    }

    /// Parses serialized descriptors from JSON; invalid input yields an empty registry.
    pub fn from_json_str(text: &str) -> Self {
        Self {
            inner: Collection::from_json_str(text, None),
        }
    }

    /// Loads serialized descriptors from a JSON file; failures yield an empty registry.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            inner: Collection::from_file(path, None),
        }
    }

    /// Registers a property.
    ///
    /// The descriptor is stored at `root[group][name]` when it names a group,
    /// otherwise at `root[name]`. A [`PropertyType::Group`] descriptor also adds
    /// its value (or its name, when the value is unset) to [`GROUPS_KEY`] once.
    /// Registering a group descriptor keeps any properties already stored under
    /// its key.
    ///
    /// # Errors
    ///
    /// A parse error for malformed shorthand, a reserved-name error when the
    /// name, group or group label is [`GROUPS_KEY`], or a path error when the
    /// group key already holds a scalar.
    pub fn property(&mut self, name: &str, descriptor: impl Into<Descriptor>) -> Result<&mut Self> {
        let descriptor: Descriptor = descriptor.into();
        let property = descriptor.resolve(name)?;
        let group = property.group().filter(|group| !group.is_empty());
        let label = match property.value() {
            Value::Null => Value::from(name),
            value => value.clone(),
        };

        reject_reserved(name)?;
        if let Some(group) = group {
            reject_reserved(group)?;
        }
        if property.is_group() {
            reject_reserved(&label.to_text())?;
        }

        let fields = property.to_map();
        match group {
            Some(group) => {
                self.inner.set_value_at_path([group, name], fields)?;
            }
            None => match self.inner.root_mut().get_mut(name) {
                Some(Value::Map(existing)) if property.is_group() => {
                    for (key, field) in fields {
                        // Children stored under a descriptor key survive re-registration
                        if matches!(existing.get(&key), Some(Value::Map(_))) && !field.is_map() {
                            continue;
                        }
                        existing.insert(key, field);
                    }
                }
                _ => {
                    self.inner.set(name, fields);
                }
            },
        }

        if property.is_group() {
            tracing::debug!(name, group = %label, "Registered property group");
            self.inner.add(GROUPS_KEY, label);
        }
        Ok(self)
    }

    /// Returns true if `name` is stored at the top level.
    pub fn has(&self, name: &str) -> bool {
        self.inner.has(name)
    }

    /// Returns the stored descriptor, or an empty descriptor named `name`.
    pub fn get_property(&self, name: &str) -> Map {
        match self.inner.get(name) {
            Some(Value::Map(map)) => map.clone(),
            _ => Property::new(name).to_map(),
        }
    }

    /// Reads a property's value.
    ///
    /// Returns `None` when nothing is stored at `name` (or `group`/`name`).
    /// Boolean properties yield a [`Value::Bool`] coerced from the value,
    /// falling back to the default; when both are unset the result is
    /// [`Value::Null`]. Every other type yields trimmed text, falling back to
    /// the trimmed default when the value is [empty-like](Value::is_empty_like).
    ///
    /// ```
    /// # use propbag::{PropertyRegistry, Value};
    /// let mut registry = PropertyRegistry::new();
    /// registry.property("enabled", "type=boolean|value=true")?;
    /// registry.property("host", "value=  example.org |default=localhost")?;
    /// registry.property("port", "default= 25 ")?;
    ///
    /// assert_eq!(registry.get_value("enabled", None), Some(Value::Bool(true)));
    /// assert_eq!(registry.get_value("host", None), Some(Value::from("example.org")));
    /// assert_eq!(registry.get_value("port", None), Some(Value::from("25")));
    /// assert_eq!(registry.get_value("missing", None), None);
    /// # Ok::<(), propbag::Error>(())
    /// ```
    pub fn get_value(&self, name: &str, group: Option<&str>) -> Option<Value> {
        let entry = self.entry(name, group)?;
        let default = entry.get("default");

        if entry_type(entry) == Some(PropertyType::Boolean) {
            let raw = entry
                .get("value")
                .filter(|value| !value.is_null())
                .or(default);
            return Some(match raw {
                None | Some(Value::Null) => Value::Null,
                Some(value) => Value::Bool(value.to_bool()),
            });
        }

        let value = entry.get("value").map(Value::to_text).unwrap_or_default();
        let value = Value::from(value.trim());
        if value.is_empty_like() {
            let default = default.map(Value::to_text).unwrap_or_default();
            Some(Value::from(default.trim()))
        } else {
            Some(value)
        }
    }

    /// Reads a property's value as text; booleans render as `"true"`/`"false"`.
    pub fn get_value_as_text(&self, name: &str, group: Option<&str>) -> Option<String> {
        let value = self.get_value(name, group)?;
        Some(match self.get_type(name, group) {
            Some(PropertyType::Boolean) => value.to_bool().to_string(),
            _ => value.to_text(),
        })
    }

    /// Reads a property's stored type.
    pub fn get_type(&self, name: &str, group: Option<&str>) -> Option<PropertyType> {
        entry_type(self.entry(name, group)?)
    }

    /// Returns every top-level descriptor of type [`PropertyType::Group`].
    pub fn get_groups(&self) -> Vec<Map> {
        self.inner
            .iter()
            .filter_map(|(_, entry)| entry.as_map())
            .filter(|entry| entry_type(entry) == Some(PropertyType::Group))
            .cloned()
            .collect()
    }

    /// Returns the registered group namespace keys.
    pub fn groups(&self) -> Vec<String> {
        match self.inner.get(GROUPS_KEY) {
            Some(Value::List(groups)) => groups.iter().map(Value::to_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Lists descriptors, optionally filtered.
    ///
    /// Without `group`, top-level descriptors that do not belong to a group
    /// are listed; with `group`, the descriptors stored under that group.
    /// Group descriptors and namespaces are never listed. Each listed
    /// descriptor has its effective value filled in.
    ///
    /// Filters combine: `editable == Some(true)` keeps descriptors that are
    /// neither readonly nor hidden, `Some(false)` keeps those that are either,
    /// and `hidden` keeps exact matches.
    pub fn get_properties_list(
        &self,
        editable: Option<bool>,
        hidden: Option<bool>,
        group: Option<&str>,
    ) -> Vec<Map> {
        let source = match group {
            Some(group) => match self.inner.get(group) {
                Some(Value::Map(children)) => children,
                _ => return Vec::new(),
            },
            None => self.inner.to_map(),
        };
        let groups = self.groups();

        source
            .iter()
            .filter(|(key, _)| {
                group.is_some() || (key.as_str() != GROUPS_KEY && !groups.contains(*key))
            })
            .filter_map(|(_, entry)| entry.as_map())
            .filter(|entry| entry_type(entry) != Some(PropertyType::Group))
            .filter(|entry| match entry.get("group").map(Value::to_text) {
                Some(own) if !own.is_empty() => Some(own.as_str()) == group,
                _ => true,
            })
            .filter(|entry| {
                let readonly = flag(entry, "readonly");
                let is_hidden = flag(entry, "hidden");
                let editable_ok =
                    editable.is_none_or(|editable| editable == !(readonly || is_hidden));
                let hidden_ok = hidden.is_none_or(|hidden| hidden == is_hidden);
                editable_ok && hidden_ok
            })
            .map(|entry| {
                let mut entry = entry.clone();
                let value = effective_value(&entry);
                entry.insert("value".to_string(), value);
                entry
            })
            .collect()
    }

    /// Returns the effective value of every property.
    ///
    /// Group namespaces become nested maps of `{child: value}`; group
    /// descriptors are skipped. A value that is null or empty text falls back
    /// to the default.
    pub fn get_values(&self) -> Map {
        let groups = self.groups();
        let mut result = Map::new();

        for (key, entry) in self.inner.iter() {
            let Value::Map(entry) = entry else {
                continue;
            };
            if groups.contains(key) {
                let children = entry
                    .iter()
                    .filter_map(|(name, child)| {
                        Some((name.clone(), effective_value(child.as_map()?)))
                    })
                    .collect::<Map>();
                result.insert(key.clone(), Value::Map(children));
            } else if entry_type(entry) != Some(PropertyType::Group) {
                result.insert(key.clone(), effective_value(entry));
            }
        }
        result
    }

    /// Resets every stored value, including grouped ones, to its default.
    pub fn clear_values(&mut self) {
        let groups = self.groups();

        for (key, entry) in self.inner.root_mut().iter_mut() {
            let Value::Map(entry) = entry else {
                continue;
            };
            if groups.contains(key) {
                for child in entry.values_mut().filter_map(Value::as_map_mut) {
                    reset_value(child);
                }
            } else if entry_type(entry) != Some(PropertyType::Group) {
                reset_value(entry);
            }
        }
    }

    /// Sets values from `data`.
    ///
    /// Keys naming a group take a map of `{child: value}`; every other key sets
    /// that property's value. The reserved [`GROUPS_KEY`] is ignored.
    ///
    /// # Errors
    ///
    /// A path error when a targeted key holds a scalar instead of a descriptor.
    pub fn set_property_values(&mut self, data: &Map) -> Result<()> {
        let groups = self.groups();

        for (key, value) in data {
            if key == GROUPS_KEY {
                continue;
            }
            if !groups.contains(key) {
                self.inner.set_value_at_path([key.as_str(), "value"], value.clone())?;
                continue;
            }
            let Value::Map(children) = value else {
                tracing::debug!(
                    group = %key,
                    found = value.type_name(),
                    "Skipping non-map group values"
                );
                continue;
            };
            for (name, item) in children {
                self.inner
                    .set_value_at_path([key.as_str(), name.as_str(), "value"], item.clone())?;
            }
        }
        Ok(())
    }

    /// Returns the underlying collection.
    pub fn collection(&self) -> &Collection {
        &self.inner
    }

    /// Returns the serialized registry.
    pub fn to_map(&self) -> &Map {
        self.inner.to_map()
    }

    /// Consumes the registry, returning its serialized form.
    pub fn into_map(self) -> Map {
        self.inner.into_map()
    }

    fn entry(&self, name: &str, group: Option<&str>) -> Option<&Map> {
        let entry = match group.filter(|group| !group.is_empty()) {
            Some(group) => self.inner.get_at_path([group, name])?,
            None => self.inner.get(name)?,
        };
        entry.as_map()
    }
}

impl From<Map> for PropertyRegistry {
    fn from(data: Map) -> Self {
        Self::from_map(data)
    }
}

impl serde::Serialize for PropertyRegistry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.inner, serializer)
    }
}

fn entry_type(entry: &Map) -> Option<PropertyType> {
    entry.get("type").and_then(PropertyType::from_value)
}

fn flag(entry: &Map, key: &str) -> bool {
    entry.get(key).is_some_and(Value::to_bool)
}

fn reject_reserved(name: &str) -> std::result::Result<(), PropertyError> {
    if name == GROUPS_KEY {
        return Err(PropertyError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn effective_value(entry: &Map) -> Value {
    match entry.get("value") {
        Some(value) if !value.is_empty_like() => value.clone(),
        _ => entry.get("default").cloned().unwrap_or_default(),
    }
}

fn reset_value(entry: &mut Map) {
    let default = entry.get("default").cloned().unwrap_or_default();
    entry.insert("value".to_string(), default);
}
