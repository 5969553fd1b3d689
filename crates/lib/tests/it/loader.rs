//! JSON loading integration tests

use std::io::Write;

use propbag::{Collection, PropertyRegistry, Value, loader};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_collection_from_file() {
    let file = write_temp(r#"{"mail":{"host":"localhost","port":25},"debug":true}"#);

    let collection = Collection::from_file(file.path(), None);
    assert_eq!(collection.get_by_path("mail/port", Value::Null), Value::from(25));
    assert!(collection.get_bool("debug", false));

    let mail = Collection::from_file(file.path(), Some("mail"));
    assert_eq!(mail.keys().collect::<Vec<_>>(), vec!["host", "port"]);
}

#[test]
fn test_bad_files_yield_empty_collections() {
    let invalid = write_temp("{ this is not json");
    assert!(Collection::from_file(invalid.path(), None).is_empty());

    let not_object = write_temp(r#"["a", "b"]"#);
    assert!(Collection::from_file(not_object.path(), None).is_empty());

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(Collection::from_file(&missing, None).is_empty());
    assert!(PropertyRegistry::from_file(&missing).to_map().is_empty());
}

#[test]
fn test_read_json_file_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader::read_json_file(dir.path().join("missing.json")).unwrap_err();
    assert!(err.is_io_error());

    let invalid = write_temp("{");
    let err = loader::read_json_file(invalid.path()).unwrap_err();
    assert_eq!(err.module(), "serialize");
}

#[test]
fn test_registry_from_file() {
    let file = write_temp(
        r#"{
            "enabled": { "name": "enabled", "type": 3, "value": true, "default": false },
            "mail": { "host": { "name": "host", "group": "mail", "type": "text", "default": "localhost" } },
            "groups": ["mail"]
        }"#,
    );

    let registry = PropertyRegistry::from_file(file.path());
    assert_eq!(registry.get_value("enabled", None), Some(Value::Bool(true)));
    assert_eq!(registry.get_value("host", Some("mail")), Some(Value::from("localhost")));
    assert_eq!(registry.groups(), vec!["mail".to_string()]);
}
