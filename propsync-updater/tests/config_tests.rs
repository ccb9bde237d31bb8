use pretty_assertions::assert_eq;
use propsync_updater::{ConfigError, DEFAULT_MAIN_WIKI, UpdaterConfig};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn defaults() {
    let config = UpdaterConfig::default();
    assert!(!config.trim_double_quotes);
    assert_eq!(config.main_wiki, DEFAULT_MAIN_WIKI);
    assert_eq!(config.http_timeout_secs, None);
    assert!(config.include_environment);
    assert!(config.properties_files.is_empty());
}

#[test]
fn load_full_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propsync.toml");
    std::fs::write(
        &path,
        r#"
trim_double_quotes = true
main_wiki = "main"
http_timeout_secs = 30
user_agent = "custom/1.0"
include_environment = false
properties_files = ["/etc/propsync/a.properties", "b.properties"]
"#,
    )
    .unwrap();

    let config = UpdaterConfig::load_from(&path).unwrap();
    assert_eq!(
        config,
        UpdaterConfig {
            trim_double_quotes: true,
            main_wiki: "main".to_string(),
            http_timeout_secs: Some(30),
            user_agent: Some("custom/1.0".to_string()),
            include_environment: false,
            properties_files: vec![
                PathBuf::from("/etc/propsync/a.properties"),
                PathBuf::from("b.properties"),
            ],
        }
    );
}

#[test]
fn missing_keys_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propsync.toml");
    std::fs::write(&path, "trim_double_quotes = true\n").unwrap();

    let config = UpdaterConfig::load_from(&path).unwrap();
    assert!(config.trim_double_quotes);
    assert_eq!(config.main_wiki, DEFAULT_MAIN_WIKI);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = UpdaterConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn invalid_toml_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propsync.toml");
    std::fs::write(&path, "trim_double_quotes = \"maybe\"\n").unwrap();

    let err = UpdaterConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("propsync.toml"));
}

#[test]
fn fetcher_settings() {
    let config = UpdaterConfig {
        http_timeout_secs: Some(5),
        user_agent: Some("agent".to_string()),
        ..UpdaterConfig::default()
    };
    let fetcher = config.fetcher_config();
    assert_eq!(fetcher.timeout, Some(Duration::from_secs(5)));
    assert_eq!(fetcher.user_agent, "agent");

    let default = UpdaterConfig::default().fetcher_config();
    assert_eq!(default.timeout, None);
    assert!(default.user_agent.starts_with("propsync/"));
}
