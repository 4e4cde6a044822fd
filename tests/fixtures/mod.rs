//! Shared test fixtures for key-mon integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use key_mon::device::{DeviceEvent, PRESS, RELEASE};
use key_mon::event_log::format_line;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Small modmap covering a modifier, two letters and a mouse button.
pub const SAMPLE_KBD: &str = "\
# sample modmap
29;KEY_LEFTCTRL;Ctrl;Ctrl
30;KEY_A;A;A
44;KEY_Z;Z;z
272;BTN_LEFT;Left;L
";

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Ctrl-A typed and released.
pub fn ctrl_a_events() -> Vec<DeviceEvent> {
    vec![
        DeviceEvent::key(29, PRESS),
        DeviceEvent::key(30, PRESS),
        DeviceEvent::key(30, RELEASE),
        DeviceEvent::key(29, RELEASE),
    ]
}

/// Event log text for `events`, one second apart.
pub fn event_log_text(events: &[DeviceEvent]) -> String {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| format!("{}\n", format_line(1_700_000_000.0 + i as f64, event)))
        .collect()
}

/// Path to the key-mon binary under test.
pub fn key_mon_bin() -> &'static str {
    env!("CARGO_BIN_EXE_key-mon")
}

/// Command with an isolated configuration directory.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(key_mon_bin());
    cmd.env("KEYMON_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

/// Fresh temporary config directory.
pub fn temp_config_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
