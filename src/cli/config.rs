//! Configuration management CLI commands.

use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
    /// Reset all options to their defaults
    Reset,
    /// Print the configuration file path
    Path,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug, Default)]
pub struct ConfigSetArgs {
    /// Theme name
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Indicator opacity (0.0 to 1.0)
    #[arg(long, value_name = "VALUE")]
    opacity: Option<f32>,

    /// Show only key combos
    #[arg(long, value_name = "BOOL")]
    only_combo: Option<bool>,

    /// Sticky modifiers
    #[arg(long, value_name = "BOOL")]
    sticky: Option<bool>,

    /// Seconds a click or scroll stays visible
    #[arg(long, value_name = "SECS")]
    visible_click_timeout: Option<f32>,

    /// Seconds without a press before fading out (0 disables)
    #[arg(long, value_name = "SECS")]
    no_press_fadeout: Option<f32>,

    /// Modmap file (path or file name in the search path)
    #[arg(long = "kbdfile", value_name = "FILE")]
    kbd_file: Option<PathBuf>,

    /// Write every device event to a log file
    #[arg(long, value_name = "BOOL")]
    event_log: Option<bool>,

    /// Directory for event logs
    #[arg(long, value_name = "DIR")]
    event_log_dir: Option<PathBuf>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
            ConfigCommand::Reset => {
                Config::default().save()?;
                println!("Configuration reset to defaults");
                Ok(())
            }
            ConfigCommand::Path => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> Result<()> {
        let config = Config::load().context("Failed to load configuration")?;

        if self.json {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{json}");
        } else {
            println!("# {}", Config::config_file_path()?.display());
            let text =
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
            print!("{text}");
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Applies the given values to `config`. Returns false when nothing was given.
    fn apply(&self, config: &mut Config) -> bool {
        let mut touched = false;

        if let Some(theme) = &self.theme {
            config.ui.theme.clone_from(theme);
            touched = true;
        }
        if let Some(opacity) = self.opacity {
            config.ui.opacity = opacity;
            touched = true;
        }
        if let Some(only_combo) = self.only_combo {
            config.ui.only_combo = only_combo;
            touched = true;
        }
        if let Some(sticky) = self.sticky {
            config.ui.sticky_mode = sticky;
            touched = true;
        }
        if let Some(timeout) = self.visible_click_timeout {
            config.ui.visible_click_timeout = timeout;
            touched = true;
        }
        if let Some(fadeout) = self.no_press_fadeout {
            config.ui.no_press_fadeout = fadeout;
            touched = true;
        }
        if let Some(kbd_file) = &self.kbd_file {
            config.devices.map = Some(kbd_file.clone());
            touched = true;
        }
        if let Some(event_log) = self.event_log {
            config.logging.event_log = event_log;
            touched = true;
        }
        if let Some(dir) = &self.event_log_dir {
            config.logging.event_log_dir = Some(dir.clone());
            touched = true;
        }

        touched
    }

    /// Execute set command
    pub fn execute(&self) -> Result<()> {
        let mut config = Config::load().context("Failed to load configuration")?;
        if !self.apply(&mut config) {
            anyhow::bail!("At least one configuration option must be specified");
        }

        config.validate()?;
        config.save()?;
        println!("Configuration updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_nothing() {
        let mut config = Config::default();
        assert!(!ConfigSetArgs::default().apply(&mut config));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_values() {
        let args = ConfigSetArgs {
            opacity: Some(0.5),
            sticky: Some(true),
            event_log: Some(false),
            ..ConfigSetArgs::default()
        };
        let mut config = Config::default();
        assert!(args.apply(&mut config));
        assert!((config.ui.opacity - 0.5).abs() < f32::EPSILON);
        assert!(config.ui.sticky_mode);
        assert!(!config.logging.event_log);
    }
}
