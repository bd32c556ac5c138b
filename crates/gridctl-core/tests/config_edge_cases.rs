//! Configuration loading edge cases

use gridctl_core::config::{Config, Profile, StorageSettings};
use pretty_assertions::assert_eq;

#[test]
fn test_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set_profile(
        "prod".into(),
        Profile {
            subscription_id: "1f1e9a3c".into(),
            api_url: Some("https://management.gridplatform.io".into()),
            resource_group: Some("ops-rg".into()),
            storage: Some(StorageSettings {
                account: "opslogs".into(),
                key: "c2VjcmV0".into(),
                endpoint_suffix: None,
                table: None,
                table_prefix: Some("ops1".into()),
            }),
            ..Default::default()
        },
    );

    config.save_to_path(&path).unwrap();
    let loaded = Config::load_from_path(&path).unwrap();

    assert_eq!(loaded.default_profile.as_deref(), Some("prod"));
    let (_, profile) = loaded.resolve_profile(None).unwrap();
    assert_eq!(profile.subscription_id, "1f1e9a3c");
    assert_eq!(
        profile.storage.as_ref().unwrap().table_prefix.as_deref(),
        Some("ops1")
    );
}

#[test]
fn test_minimal_toml_parses_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "dev"

[profiles.dev]
subscription_id = "sub-dev"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    let (name, profile) = config.resolve_profile(None).unwrap();
    assert_eq!(name, "dev");
    assert!(profile.api_url.is_none());
    assert!(profile.poll.interval_secs.is_none());
    assert!(profile.storage.is_none());
}

#[test]
fn test_poll_settings_parse_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[profiles.dev]
subscription_id = "sub-dev"

[profiles.dev.poll]
interval_secs = 10
timeout_mins = 45
delete_cutoff_hours = 72
cleanup_on_error = true
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    let profile = config.profiles.get("dev").unwrap();
    assert_eq!(profile.poll.interval_secs, Some(10));
    assert_eq!(profile.poll.timeout_mins, Some(45));
    assert_eq!(profile.poll.delete_cutoff_hours, Some(72));
    assert_eq!(profile.poll.cleanup_on_error, Some(true));
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "profiles = 3").unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("configuration error"));
}

#[test]
fn test_unknown_profile_is_an_error() {
    let config = Config::default();
    let err = config.resolve_profile(Some("missing")).unwrap_err();
    assert!(err.to_string().contains("missing"));
}
