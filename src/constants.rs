//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the configuration locations.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Keyboard Status Monitor";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "key-mon";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "key-mon";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "KEYMON_CONFIG_DIR";

/// File extension of modmap files.
pub const KBD_EXTENSION: &str = "kbd";

/// File name used when installing the bundled modmap.
pub const BUNDLED_KBD_NAME: &str = "us.kbd";
