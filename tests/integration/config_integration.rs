//! Integration tests for Configuration System

use crate::integration::test_utils::with_env;
use frameview::config::{ConfigLoader, DEFAULT_CAS_BASE_URL};
use tempfile::TempDir;

fn write_workspace_config(workspace: &std::path::Path, name: &str, contents: &str) {
    let config_dir = workspace.join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_defaults_without_any_source() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir_all(&workspace).unwrap();

    let config = with_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.cas.base_url, DEFAULT_CAS_BASE_URL);
    assert_eq!(config.store.message_topic, "message");
    assert!(config.validate().is_ok());
}

#[test]
fn test_workspace_file_then_env_file() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[cas]
base_url = "http://base.internal/cas"
request_timeout_secs = 12

[store]
message_topic = "chat"
"#,
    );
    write_workspace_config(
        &workspace,
        "staging.toml",
        r#"
[cas]
base_url = "http://staging.internal/cas"
"#,
    );

    let config = with_env(&temp_dir, &[("FRAMEVIEW_ENV", "staging")], || {
        ConfigLoader::load(&workspace).unwrap()
    });
    assert_eq!(config.cas.base_url, "http://staging.internal/cas");
    assert_eq!(config.cas.request_timeout_secs, 12);
    assert_eq!(config.store.message_topic, "chat");
}

#[test]
fn test_environment_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[cas]
base_url = "http://base.internal/cas"
"#,
    );

    let config = with_env(
        &temp_dir,
        &[
            ("FRAMEVIEW_CAS__BASE_URL", "http://env.internal/cas"),
            ("FRAMEVIEW_CAS__REQUEST_TIMEOUT_SECS", "7"),
        ],
        || ConfigLoader::load(&workspace).unwrap(),
    );
    assert_eq!(config.cas.base_url, "http://env.internal/cas");
    assert_eq!(config.cas.request_timeout_secs, 7);
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("frameview.toml");
    std::fs::write(
        &config_file,
        r#"
[cas]
base_url = "blobs.internal"

[store]
message_topic = ""
"#,
    )
    .unwrap();

    let config = with_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);

    let message = config.ensure_valid().unwrap_err().to_string();
    assert!(message.contains("base_url"));
    assert!(message.contains("message_topic"));
}

#[test]
fn test_logging_section_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("frameview.toml");
    std::fs::write(
        &config_file,
        r#"
[logging]
level = "debug"
format = "json"

[logging.modules]
"frameview::cas" = "trace"
"#,
    )
    .unwrap();

    let config = with_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.output, "stderr");
    assert_eq!(
        config.logging.modules.get("frameview::cas").map(String::as_str),
        Some("trace")
    );
}
