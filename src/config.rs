//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution. Every section
//! rejects unknown keys so typos fail at load time.

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME, KBD_EXTENSION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound, in seconds, for the timing options.
pub const MAX_TIMEOUT_SECS: f32 = 3600.0;

/// Indicator behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Theme name; persisted only
    pub theme: String,
    /// Indicator opacity, 0.0..=1.0
    pub opacity: f32,
    /// Show non-modifier keys only while a modifier is held
    pub only_combo: bool,
    /// Latch modifiers until the next non-modifier key is released
    pub sticky_mode: bool,
    /// Persisted only
    pub visible_click: bool,
    /// Persisted only
    pub follow_mouse: bool,
    /// Seconds a click or scroll stays visible
    pub visible_click_timeout: f32,
    /// Seconds without a press before the indicator fades out (0 disables)
    pub no_press_fadeout: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "classic".to_string(),
            opacity: 1.0,
            only_combo: false,
            sticky_mode: false,
            visible_click: false,
            follow_mouse: false,
            visible_click_timeout: 0.2,
            no_press_fadeout: 0.0,
        }
    }
}

impl UiConfig {
    /// Click/scroll visibility as a duration.
    pub fn visible_click_duration(&self) -> Duration {
        seconds(self.visible_click_timeout)
    }

    /// Fade-out delay, `None` when disabled.
    pub fn no_press_fadeout_duration(&self) -> Option<Duration> {
        (self.no_press_fadeout > 0.0).then(|| seconds(self.no_press_fadeout))
    }
}

/// Clamped into `0..=MAX_TIMEOUT_SECS`; NaN becomes zero.
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.clamp(0.0, MAX_TIMEOUT_SECS)).unwrap_or_default()
}

/// Input device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DevicesConfig {
    /// Modmap file override: a path, or the file name of a search-path candidate
    pub map: Option<PathBuf>,
    /// Explicit event devices; empty means auto-discover
    pub inputs: Vec<PathBuf>,
}

/// Saved indicator position; persisted only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionConfig {
    /// X coordinate, -1 when unset
    pub x: i32,
    /// Y coordinate, -1 when unset
    pub y: i32,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self { x: -1, y: -1 }
    }
}

/// Event log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Write every device event to a log file
    pub event_log: bool,
    /// Directory for event logs; the OS temp dir when unset
    pub event_log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            event_log: true,
            event_log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Directory event logs are written to.
    pub fn log_dir(&self) -> PathBuf {
        self.event_log_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Application configuration.
///
/// # File Location
///
/// - `$KEYMON_CONFIG_DIR/config.toml` when the variable is set
/// - Linux: `~/.config/key-mon/config.toml`
/// - macOS: `~/Library/Application Support/key-mon/config.toml`
/// - Windows: `%APPDATA%\key-mon\config.toml`
///
/// # Validation
///
/// - `opacity` must be within 0.0..=1.0
/// - `visible_click_timeout` and `no_press_fadeout` must be finite and non-negative
/// - `theme` must not be empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Indicator behaviour
    pub ui: UiConfig,
    /// Input devices and modmap
    pub devices: DevicesConfig,
    /// Saved position
    pub position: PositionConfig,
    /// Event log
    pub logging: LoggingConfig,
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path, honouring `KEYMON_CONFIG_DIR`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to a specific file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let ui = &self.ui;
        if !(0.0..=1.0).contains(&ui.opacity) {
            anyhow::bail!("ui.opacity must be between 0.0 and 1.0, got {}", ui.opacity);
        }
        if !(0.0..=MAX_TIMEOUT_SECS).contains(&ui.visible_click_timeout) {
            anyhow::bail!(
                "ui.visible_click_timeout must be between 0 and {MAX_TIMEOUT_SECS} seconds, got {}",
                ui.visible_click_timeout
            );
        }
        if !(0.0..=MAX_TIMEOUT_SECS).contains(&ui.no_press_fadeout) {
            anyhow::bail!(
                "ui.no_press_fadeout must be between 0 and {MAX_TIMEOUT_SECS} seconds, got {}",
                ui.no_press_fadeout
            );
        }
        if ui.theme.trim().is_empty() {
            anyhow::bail!("ui.theme must not be empty");
        }
        Ok(())
    }

    /// Directories searched for modmap files, in priority order.
    pub fn kbd_search_dirs() -> Result<Vec<PathBuf>> {
        let base = Self::config_dir()?;
        Ok(vec![base.join("kbd"), base])
    }

    /// Candidate modmap files: every `*.kbd` in the search dirs, sorted per dir.
    pub fn kbd_files() -> Result<Vec<PathBuf>> {
        Ok(kbd_files_in(&Self::kbd_search_dirs()?))
    }

    /// Resolves the `devices.map` override against the candidate list.
    ///
    /// A bare file name that does not exist relative to the working directory
    /// is matched against candidate file names.
    pub fn kbd_override(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        let map = self.devices.map.as_ref()?;
        if map.is_absolute() || map.exists() {
            return Some(map.clone());
        }
        candidates
            .iter()
            .find(|candidate| candidate.file_name() == Some(map.as_os_str()))
            .cloned()
            .or_else(|| Some(map.clone()))
    }
}

/// Every `*.kbd` file in `dirs`, each directory's files sorted by name.
pub fn kbd_files_in(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        let mut found: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == KBD_EXTENSION)
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
