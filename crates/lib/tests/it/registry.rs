//! PropertyRegistry integration tests
//!
//! Covers descriptor resolution, group storage, value reads and the batch
//! value operations.

use propbag::{
    ConfigProperties, Descriptor, GROUPS_KEY, Property, PropertyRegistry, PropertyType, Result,
    Value,
};
use serde_json::json;

use crate::helpers::*;

// ===== REGISTRATION =====

#[test]
fn test_boolean_from_attribute_map() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("enabled", map(json!({ "type": "boolean", "value": "true" })))
        .unwrap();

    assert_eq!(registry.get_value("enabled", None), Some(Value::Bool(true)));
    assert!(registry.get_value("enabled", None).unwrap() == true);
    assert_entry_type(&registry, "enabled", None, PropertyType::Boolean);
}

#[test]
fn test_every_descriptor_variant() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("a", map(json!({ "type": "number", "default": 1 })))
        .unwrap()
        .property("b", Property::new("b").with_type(PropertyType::Url))
        .unwrap()
        .property("c", "type=text-area|default=hello")
        .unwrap()
        .property(
            "d",
            Descriptor::configure(|property| {
                property.set_type(PropertyType::Password).set_hidden(true);
            }),
        )
        .unwrap();

    assert_entry_type(&registry, "a", None, PropertyType::Number);
    assert_entry_type(&registry, "b", None, PropertyType::Url);
    assert_entry_type(&registry, "c", None, PropertyType::TextArea);
    assert_entry_type(&registry, "d", None, PropertyType::Password);

    // Unnamed descriptors take the registration name.
    assert_eq!(registry.get_property("a").get("name"), Some(&Value::from("a")));
    assert_eq!(registry.get_property("d").get("name"), Some(&Value::from("d")));
    assert_eq!(registry.get_property("d").get("hidden"), Some(&Value::Bool(true)));
}

#[test]
fn test_malformed_shorthand_is_rejected() {
    let mut registry = PropertyRegistry::new();
    let err = registry.property("broken", "type").unwrap_err();
    assert!(err.is_parse_error());
    assert!(!registry.has("broken"));
}

#[test]
fn test_grouped_properties_are_nested() {
    let registry = setup_registry();

    assert_eq!(registry.groups(), vec!["mail".to_string()]);
    assert_eq!(
        registry.to_map().get(GROUPS_KEY),
        Some(&value(json!(["mail"])))
    );
    assert!(!registry.has("host"));
    assert_entry_type(&registry, "host", Some("mail"), PropertyType::Text);
    assert_entry_type(&registry, "password", Some("mail"), PropertyType::Password);
}

#[test]
fn test_group_without_value_uses_its_name() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("storage", Descriptor::configure(|p| {
            p.set_type(PropertyType::Group);
        }))
        .unwrap()
        .property("path", "group=storage|default=/tmp")
        .unwrap();

    assert_eq!(registry.groups(), vec!["storage".to_string()]);
    assert_eq!(
        registry.get_value("path", Some("storage")),
        Some(Value::from("/tmp"))
    );
}

#[test]
fn test_re_registering_group_keeps_children() {
    let mut registry = setup_registry();
    registry
        .property("mail", "type=group|value=mail|title=Outgoing mail")
        .unwrap();

    assert_eq!(registry.groups(), vec!["mail".to_string()]);
    assert_eq!(registry.get_value("host", Some("mail")), Some(Value::from("localhost")));
    assert_eq!(registry.get_groups().len(), 1);
    assert_eq!(
        registry.get_groups()[0].get("title"),
        Some(&Value::from("Outgoing mail"))
    );
}

#[test]
fn test_re_registering_group_keeps_child_named_like_a_field() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("mail", "type=group|value=mail|title=Mail")
        .unwrap()
        .property("title", "group=mail|default=Subject")
        .unwrap()
        .property("mail", "type=group|value=mail|title=Mail again")
        .unwrap();

    assert_eq!(registry.get_value("title", Some("mail")), Some(Value::from("Subject")));
    assert_eq!(registry.get_type("mail", None), Some(PropertyType::Group));
    assert_eq!(registry.groups(), vec!["mail".to_string()]);
}

#[test]
fn test_reserved_groups_key_is_rejected() {
    let mut registry = PropertyRegistry::new();

    let err = registry.property(GROUPS_KEY, "type=text|default=x").unwrap_err();
    assert!(err.is_structural_error());
    let err = registry.property("host", "group=groups").unwrap_err();
    assert!(err.is_structural_error());
    let err = registry.property("mail", "type=group|value=groups").unwrap_err();
    assert!(err.is_structural_error());
    let err = registry.property(GROUPS_KEY, "type=group").unwrap_err();
    assert!(err.is_structural_error());
    assert!(registry.to_map().is_empty());

    registry.property("mail", "type=group|value=mail").unwrap();
    assert_eq!(registry.groups(), vec!["mail".to_string()]);
}

#[test]
fn test_get_property_of_missing_name() {
    let registry = PropertyRegistry::new();
    let descriptor = registry.get_property("ghost");
    assert_eq!(descriptor, Property::new("ghost").to_map());
}

// ===== VALUE READS =====

#[test]
fn test_get_value_trims_and_falls_back() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("padded", map(json!({ "value": "  hi  ", "default": "x" })))
        .unwrap()
        .property("blank", map(json!({ "value": "   ", "default": "  fallback " })))
        .unwrap()
        .property("number", map(json!({ "type": "number", "value": 42 })))
        .unwrap()
        .property("unset", map(json!({})))
        .unwrap();

    assert_eq!(registry.get_value("padded", None), Some(Value::from("hi")));
    assert_eq!(registry.get_value("blank", None), Some(Value::from("fallback")));
    assert_eq!(registry.get_value("number", None), Some(Value::from("42")));
    assert_eq!(registry.get_value("unset", None), Some(Value::from("")));
    assert_eq!(registry.get_value("missing", None), None);
    assert_eq!(registry.get_value("host", Some("missing_group")), None);
}

#[test]
fn test_zero_values_fall_back_to_default() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("port", "type=number|value=0|default=25")
        .unwrap()
        .property("retries", map(json!({ "type": "number", "value": 0, "default": 3 })))
        .unwrap()
        .property("name", "value=0")
        .unwrap();

    assert_eq!(registry.get_value("port", None), Some(Value::from("25")));
    assert_eq!(registry.get_value("retries", None), Some(Value::from("3")));
    assert_eq!(registry.get_value("name", None), Some(Value::from("")));
    assert_eq!(
        Value::Map(registry.get_values()),
        value(json!({ "port": "25", "retries": 3, "name": null }))
    );
}

#[test]
fn test_boolean_values_and_text() {
    let mut registry = PropertyRegistry::new();
    registry
        .property("on", "type=boolean|value=1")
        .unwrap()
        .property("off", "type=boolean|value=0|default=true")
        .unwrap()
        .property("defaulted", "type=boolean|default=true")
        .unwrap()
        .property("unset", "type=boolean")
        .unwrap();

    assert_eq!(registry.get_value("on", None), Some(Value::Bool(true)));
    assert_eq!(registry.get_value("off", None), Some(Value::Bool(false)));
    assert_eq!(registry.get_value("defaulted", None), Some(Value::Bool(true)));
    assert_eq!(registry.get_value("unset", None), Some(Value::Null));

    assert_eq!(registry.get_value_as_text("on", None).as_deref(), Some("true"));
    assert_eq!(registry.get_value_as_text("off", None).as_deref(), Some("false"));
    assert_eq!(registry.get_value_as_text("unset", None).as_deref(), Some("false"));
    assert_eq!(registry.get_value_as_text("missing", None), None);
}

#[test]
fn test_get_value_as_text_for_text_types() {
    let registry = setup_registry();
    assert_eq!(
        registry.get_value_as_text("title", None).as_deref(),
        Some("Untitled")
    );
    assert_eq!(
        registry.get_value_as_text("host", Some("mail")).as_deref(),
        Some("localhost")
    );
}

// ===== LISTING =====

#[test]
fn test_get_groups() {
    let registry = setup_registry();
    let groups = registry.get_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].get("title"), Some(&Value::from("Mail settings")));
}

#[test]
fn test_properties_list_filters() {
    let mut registry = setup_registry();
    registry
        .property("locked", "readonly=true|default=fixed")
        .unwrap()
        .property("ghost", "hidden=true")
        .unwrap();

    let names = |list: Vec<propbag::Map>| -> Vec<String> {
        list.iter()
            .filter_map(|entry| entry.get("name").map(Value::to_text))
            .collect()
    };

    assert_eq!(
        names(registry.get_properties_list(None, None, None)),
        vec!["enabled", "title", "locked", "ghost"]
    );
    assert_eq!(
        names(registry.get_properties_list(Some(true), None, None)),
        vec!["enabled", "title"]
    );
    assert_eq!(
        names(registry.get_properties_list(Some(false), None, None)),
        vec!["locked", "ghost"]
    );
    assert_eq!(
        names(registry.get_properties_list(Some(false), Some(true), None)),
        vec!["ghost"]
    );
    assert_eq!(
        names(registry.get_properties_list(None, Some(true), Some("mail"))),
        vec!["password"]
    );
    assert_eq!(
        names(registry.get_properties_list(Some(true), None, Some("mail"))),
        vec!["host"]
    );
    assert!(registry.get_properties_list(None, None, Some("nope")).is_empty());
}

#[test]
fn test_properties_list_fills_effective_value() {
    let registry = setup_registry();
    let list = registry.get_properties_list(None, None, None);
    let title = list
        .iter()
        .find(|entry| entry.get("name") == Some(&Value::from("title")))
        .unwrap();
    assert_eq!(title.get("value"), Some(&Value::from("Untitled")));
}

// ===== BATCH VALUES =====

#[test]
fn test_get_values_nests_groups() {
    let registry = setup_registry();
    assert_eq!(
        Value::Map(registry.get_values()),
        value(json!({
            "enabled": "true",
            "title": "Untitled",
            "mail": { "host": "localhost", "password": null }
        }))
    );
}

#[test]
fn test_set_values_then_clear() {
    let mut registry = setup_registry();
    registry
        .set_property_values(&map(json!({
            "title": "Home",
            "mail": { "host": "smtp.example.org", "password": "secret" },
            "groups": ["should", "be", "ignored"]
        })))
        .unwrap();

    assert_eq!(registry.get_value("title", None), Some(Value::from("Home")));
    assert_eq!(
        registry.get_value("host", Some("mail")),
        Some(Value::from("smtp.example.org"))
    );
    assert_eq!(registry.groups(), vec!["mail".to_string()]);

    registry.clear_values();
    assert_eq!(
        Value::Map(registry.get_values()),
        value(json!({
            "enabled": null,
            "title": "Untitled",
            "mail": { "host": "localhost", "password": null }
        }))
    );
    assert_eq!(registry.groups(), vec!["mail".to_string()]);
    assert_eq!(registry.get_groups()[0].get("value"), Some(&Value::from("mail")));
}

#[test]
fn test_set_values_rejects_scalar_targets() {
    let mut registry = PropertyRegistry::from_map(map(json!({ "plain": 5 })));
    let err = registry
        .set_property_values(&map(json!({ "plain": 6 })))
        .unwrap_err();
    assert!(err.is_structural_error());
}

// ===== LOADING AND CONFIG =====

#[test]
fn test_json_round_trip() {
    let registry = setup_registry();
    let text = serde_json::to_string(&registry).unwrap();
    let restored = PropertyRegistry::from_json_str(&text);

    assert_eq!(restored, registry);
    assert_eq!(restored.get_value("enabled", None), Some(Value::Bool(true)));
}

struct Mailer;

impl ConfigProperties for Mailer {
    fn init_config_properties(&self, properties: &mut PropertyRegistry) -> Result<()> {
        properties
            .property("host", "type=text|default=localhost")?
            .property("port", "type=number|default=25")?
            .property("tls", "type=boolean|default=false")?;
        Ok(())
    }
}

struct Broken;

impl ConfigProperties for Broken {
    fn init_config_properties(&self, properties: &mut PropertyRegistry) -> Result<()> {
        properties.property("bad", "no separator")?;
        Ok(())
    }
}

#[test]
fn test_config_properties() {
    let config = Mailer.create_config_properties().unwrap();
    assert_eq!(config.keys().collect::<Vec<_>>(), vec!["host", "port", "tls"]);

    let registry = Mailer.load_config_properties(&serde_json::to_string(&config).unwrap());
    assert_eq!(registry.get_value("port", None), Some(Value::from("25")));
    assert_eq!(registry.get_value("tls", None), Some(Value::Bool(false)));

    assert!(Broken.create_config_properties().unwrap_err().is_parse_error());
}
