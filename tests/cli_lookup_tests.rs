//! End-to-end tests for `key-mon lookup`.

mod fixtures;
use fixtures::*;

#[test]
fn test_lookup_with_modmap_file() {
    let config_dir = temp_config_dir();
    let kbd = write_file(config_dir.path(), "kbd/sample.kbd", SAMPLE_KBD);

    let output = isolated_command(
        &["lookup", "44", "--kbdfile", kbd.to_str().unwrap()],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "KEY_Z\tZ\tz\n");
}

#[test]
fn test_lookup_discovers_modmap_in_config_dir() {
    let config_dir = temp_config_dir();
    write_file(config_dir.path(), "kbd/sample.kbd", SAMPLE_KBD);

    let output = isolated_command(&["lookup", "272", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["scan_code"], 272);
    assert_eq!(result["code"], "BTN_LEFT");
    assert_eq!(result["medium_label"], "Left");
    assert_eq!(result["short_label"], "L");
    assert_eq!(result["mapped"], true);
    assert!(result["modmap"].as_str().unwrap().ends_with("sample.kbd"));
}

#[test]
fn test_lookup_unmapped_code_uses_fallback() {
    let config_dir = temp_config_dir();

    let output = isolated_command(&["lookup", "999", "KEY_Z", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["code"], "KEY_Z");
    assert_eq!(result["medium_label"], "Z");
    assert_eq!(result["short_label"], "Z");
    assert_eq!(result["mapped"], false);
    assert!(result.get("modmap").is_none());
}

#[test]
fn test_lookup_defaults_to_kernel_name() {
    let config_dir = temp_config_dir();

    let output = isolated_command(&["lookup", "30"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "KEY_A\tA\tA\n");
}

#[test]
fn test_lookup_without_any_name() {
    let config_dir = temp_config_dir();

    let output = isolated_command(&["lookup", "60000"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "KEY_60000\t60000\t60000\n"
    );
}

#[test]
fn test_lookup_warns_about_broken_config() {
    let config_dir = temp_config_dir();
    write_file(config_dir.path(), "config.toml", "[ui]\nopacity = \"high\"\n");

    let output = isolated_command(&["lookup", "30"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "KEY_A\tA\tA\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Ignoring unusable configuration"),
        "Unexpected stderr: {stderr}"
    );
}
