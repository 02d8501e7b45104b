// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration handling

use photobox::config::Config;
use tempfile::TempDir;

#[test]
fn defaults_match_booth_expectations() {
    let config = Config::default();
    assert_eq!(config.countdown_seconds, 5);
    assert_eq!(config.preview_seconds, 20);
    assert_eq!(config.collage_preview_seconds, 1);
    assert!(config.show_collage);
    assert!(config.countdown_sound.is_none());
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings").join("config.json");

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
    assert!(path.is_file());

    // a second load reads the file it just wrote
    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn saved_settings_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.countdown_seconds = 3;
    config.preview_seconds = 8;
    config.welcome_message = "Say cheese".to_string();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn unknown_and_missing_fields_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"countdown_seconds": 7}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.countdown_seconds, 7);
    assert_eq!(config.preview_seconds, Config::default().preview_seconds);
}

#[test]
fn garbage_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}
