//! Config file parsing and store wiring.

use std::path::Path;

use tds_cli::config::CliConfig;
use tempfile::tempdir;

#[test]
fn empty_file_gives_defaults() {
    let config = CliConfig::from_toml_str("").unwrap();
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.claude.max_tokens, 400);
    assert_eq!(config.autosave.debounce_ms, 500);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = CliConfig::from_toml_str(
        r#"
state_dir = "/tmp/tds-state"
catalog_path = "categories.csv"

[autosave]
debounce_ms = 250

[claude]
model = "claude-3-5-sonnet-latest"
"#,
    )
    .unwrap();

    assert_eq!(config.state_dir.as_deref(), Some(Path::new("/tmp/tds-state")));
    assert_eq!(config.autosave.debounce_ms, 250);
    assert!(config.autosave.enabled);
    assert_eq!(config.claude.model, "claude-3-5-sonnet-latest");
    assert_eq!(config.claude.timeout_secs, 30);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(CliConfig::from_toml_str("api_key = \"sk-ant-123\"").is_err());
}

#[test]
fn flag_overrides_file_state_dir() {
    let config = CliConfig {
        state_dir: Some("/from/file".into()),
        legacy_path: Some("/old/.env".into()),
        ..CliConfig::default()
    };

    let store = config.store_config(Some(Path::new("/from/flag"))).unwrap();
    assert_eq!(store.state_dir, Path::new("/from/flag"));
    assert_eq!(store.legacy_path.as_deref(), Some(Path::new("/old/.env")));

    let store = config.store_config(None).unwrap();
    assert_eq!(store.state_dir, Path::new("/from/file"));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(CliConfig::load(Some(&dir.path().join("missing.toml"))).is_err());

    let path = dir.path().join("tds.toml");
    std::fs::write(&path, "legacy_path = \"/old/.env\"\n").unwrap();
    let config = CliConfig::load(Some(&path)).unwrap();
    assert_eq!(config.legacy_path.as_deref(), Some(Path::new("/old/.env")));
}
