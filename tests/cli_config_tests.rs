//! End-to-end tests for `key-mon config` commands.

use std::fs;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_default() {
    let config_dir = temp_config_dir();
    let output = isolated_command(&["config", "show"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("config.toml"), "Should name the config file");
    assert!(stdout.contains("[ui]"), "Should contain the ui table");
    assert!(stdout.contains("theme = \"classic\""));
}

#[test]
fn test_config_show_json_format() {
    let config_dir = temp_config_dir();
    let output = isolated_command(&["config", "show", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: serde_json::Value =
        serde_json::from_str(&stdout).expect("Should parse JSON output");

    assert!(result["ui"].is_object(), "Should have ui object");
    assert!(result["devices"].is_object(), "Should have devices object");
    assert!(result["position"].is_object(), "Should have position object");
    assert!(result["logging"].is_object(), "Should have logging object");
    assert_eq!(result["ui"]["theme"], "classic");
    assert_eq!(result["ui"]["only_combo"], false);
    assert_eq!(result["position"]["x"], -1);
    assert_eq!(result["logging"]["event_log"], true);
}

#[test]
fn test_config_path() {
    let config_dir = temp_config_dir();
    let output = isolated_command(&["config", "path"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        config_dir.path().join("config.toml").display().to_string()
    );
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_persists() {
    let config_dir = temp_config_dir();
    let output = isolated_command(
        &["config", "set", "--sticky", "true", "--opacity", "0.5"],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Set should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration updated"));

    let output = isolated_command(&["config", "show", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["ui"]["sticky_mode"], true);
    assert_eq!(result["ui"]["opacity"], 0.5);
}

#[test]
fn test_config_set_requires_option() {
    let config_dir = temp_config_dir();
    let output = isolated_command(&["config", "set"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("At least one configuration option must be specified"),
        "Unexpected stderr: {stderr}"
    );
    assert!(!config_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_invalid_opacity() {
    let config_dir = temp_config_dir();
    let output = isolated_command(&["config", "set", "--opacity", "1.5"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ui.opacity"));
}

#[test]
fn test_config_set_rejects_huge_fadeout() {
    let config_dir = temp_config_dir();
    let output = isolated_command(
        &["config", "set", "--no-press-fadeout", "1e30"],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ui.no_press_fadeout"), "Unexpected stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "Unexpected stderr: {stderr}");
}

#[test]
fn test_replay_with_huge_fadeout_in_file_fails_cleanly() {
    let config_dir = temp_config_dir();
    fs::write(
        config_dir.path().join("config.toml"),
        "[ui]\nno_press_fadeout = 1e30\n",
    )
    .unwrap();
    let log = write_file(config_dir.path(), "events.log", "");

    let output = isolated_command(&["replay", log.to_str().unwrap()], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ui.no_press_fadeout"), "Unexpected stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "Unexpected stderr: {stderr}");
}

// ============================================================================
// Reset and Validation Tests
// ============================================================================

#[test]
fn test_config_reset() {
    let config_dir = temp_config_dir();
    isolated_command(&["config", "set", "--only-combo", "true"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    let output = isolated_command(&["config", "reset"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration reset to defaults"));

    let output = isolated_command(&["config", "show", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["ui"]["only_combo"], false);
}

#[test]
fn test_config_unknown_key_is_rejected() {
    let config_dir = temp_config_dir();
    fs::write(
        config_dir.path().join("config.toml"),
        "[ui]\ntheme = \"classic\"\nsmaller = true\n",
    )
    .unwrap();

    let output = isolated_command(&["config", "show"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config file"), "Unexpected stderr: {stderr}");
}
