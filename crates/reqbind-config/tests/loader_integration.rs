//! File-based loading tests for `ConfigLoader`.

use std::io::Write;

use reqbind_config::{ConfigError, ConfigLoader};
use tempfile::{Builder, NamedTempFile};

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = config_file(".toml", "vacuum = true\nmax_body_size = 512\n");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert!(config.vacuum);
    assert_eq!(config.max_body_size, 512);
}

#[test]
fn test_load_json_file() {
    let file = config_file(".json", r#"{"vacuum": false, "max_multipart_fields": 3}"#);

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert!(!config.vacuum);
    assert_eq!(config.max_multipart_fields, 3);
}

#[test]
fn test_unsupported_extension() {
    let file = config_file(".yaml", "vacuum: true\n");

    let result = ConfigLoader::new().with_file(file.path());

    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
}

#[test]
fn test_malformed_file() {
    let file = config_file(".toml", "vacuum = \n");

    let result = ConfigLoader::new().with_file(file.path());

    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_file_config_builds_binder() {
    let file = config_file(".toml", "vacuum = true\n");

    let binder = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("REQBIND_LOADER_TEST_UNSET")
        .load_binder()
        .unwrap();

    assert!(binder.config().vacuum);
}
