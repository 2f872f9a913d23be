use std::fs;
use sudoers_fs::NormalizedPath;
use sudoers_meta::{AgentConfig, Error};
use tempfile::TempDir;

#[test]
fn test_load_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("agent.toml"));

    let config = AgentConfig::load(&path).unwrap();

    assert_eq!(config, AgentConfig::default());
}

#[test]
fn test_load_disabled_accounts_daemon() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("agent.toml");
    fs::write(&file_path, "[daemons]\naccounts_daemon = false\n").unwrap();

    let config = AgentConfig::load(&NormalizedPath::new(&file_path)).unwrap();

    assert!(!config.accounts_daemon_enabled());
}

#[test]
fn test_load_yaml_config() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("agent.yaml");
    fs::write(&file_path, "daemons:\n  accounts_daemon: false\n").unwrap();

    let config = AgentConfig::load(&NormalizedPath::new(&file_path)).unwrap();

    assert!(!config.accounts_daemon_enabled());
}

#[test]
fn test_load_invalid_config() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("agent.toml");
    fs::write(&file_path, "[daemons]\naccounts_daemon = \"maybe\"\n").unwrap();

    let result = AgentConfig::load(&NormalizedPath::new(&file_path));

    assert!(matches!(result, Err(Error::InvalidConfig { .. })));
}
