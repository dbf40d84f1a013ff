// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use backend_lib::config::Settings;
use backend_lib::SecurityError;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.log_level, "info");
    assert_eq!(settings.crypto.bcrypt_cost, 10);
    assert_eq!(settings.crypto.kdf_log_n, 15);
    assert_eq!(settings.sessions.domain, "default");
    assert_eq!(settings.sessions.max_idle(), Duration::from_secs(1800));
    assert_eq!(settings.sessions.sweep_interval(), Duration::from_secs(60));
    assert_eq!(settings.sessions.rate_limit, 2000.0);
    assert!(settings.sessions.active);

    // No key material by default, so defaults alone are not usable
    assert!(settings.validate().is_err());
}

#[test]
fn test_load_config_from_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("tollgate.toml");

    let config_content = r#"
        log_level = "debug"

        [crypto]
        passphrase = "file passphrase"
        salt = "deadbeef"
        bcrypt_cost = 5
        kdf_log_n = 6

        [sessions]
        domain = "console"
        max_idle_secs = 90
        sweep_interval_secs = 15
        rate_limit = 12.0
        active = false

        [sessions.roles]
        alice = ["admin"]
    "#;
    fs::write(&config_path, config_content).unwrap();

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.crypto.passphrase, "file passphrase");
    assert_eq!(settings.crypto.bcrypt_cost, 5);
    assert_eq!(settings.crypto.kdf_log_n, 6);
    assert_eq!(settings.sessions.domain, "console");
    assert_eq!(settings.sessions.max_idle_secs, 90);
    assert_eq!(settings.sessions.sweep_interval_secs, 15);
    assert_eq!(settings.sessions.rate_limit, 12.0);
    assert!(!settings.sessions.active);
    assert_eq!(settings.sessions.roles["alice"], vec!["admin".to_string()]);
}

#[test]
fn test_load_rejects_out_of_range_rate_limit() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("tollgate.toml");
    fs::write(
        &config_path,
        "[crypto]\npassphrase = \"p\"\nsalt = \"s\"\n[sessions]\nrate_limit = 5000.0\n",
    )
    .unwrap();

    assert!(matches!(
        Settings::load_from(&config_path),
        Err(SecurityError::Config(_))
    ));
}

#[test]
fn test_load_rejects_malformed_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("tollgate.toml");
    fs::write(&config_path, "[sessions]\nmax_idle_secs = \"soon\"\n").unwrap();

    assert!(matches!(
        Settings::load_from(&config_path),
        Err(SecurityError::Config(_))
    ));
}
