//! `key-mon run` and `key-mon replay`: drive the event loop.

use crate::config::{Config, LoggingConfig};
use crate::constants::APP_NAME;
use crate::device::kernel::{discover_devices, EvdevSource};
use crate::device::replay::ReplaySource;
use crate::event_log::EventLog;
use crate::modmap::{read_mod_map_safely, ModTable};
use crate::monitor::{EventLoop, Indicator, IndicatorOptions, StopHandle, IDLE_SLEEP};
use anyhow::{Context, Result};
use clap::Args;
use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Run the monitor on live input devices
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Input event device to listen to (repeatable); auto-discovered when omitted
    #[arg(long = "device", value_name = "PATH")]
    pub devices: Vec<PathBuf>,

    /// Use this kbd (modmap) file
    #[arg(long = "kbdfile", value_name = "FILE")]
    pub kbd_file: Option<PathBuf>,

    /// Show only key combos (ex. Control-A)
    #[arg(long)]
    pub only_combo: bool,

    /// Sticky mode: modifiers stay shown until the next key is released
    #[arg(long)]
    pub sticky: bool,

    /// Seconds a click or scroll stays visible
    #[arg(long, value_name = "SECS")]
    pub visible_click_timeout: Option<f32>,

    /// Fade out after this many seconds with no key press
    #[arg(long, value_name = "SECS")]
    pub no_press_fadeout: Option<f32>,

    /// Do not write the event log
    #[arg(long)]
    pub no_event_log: bool,

    /// Reset all options to their defaults
    #[arg(long)]
    pub reset: bool,
}

impl RunArgs {
    /// Returns `config` with this run's command-line overrides applied.
    pub fn apply(&self, config: &Config) -> Config {
        let mut effective = config.clone();
        if self.only_combo {
            effective.ui.only_combo = true;
        }
        if self.sticky {
            effective.ui.sticky_mode = true;
        }
        if let Some(timeout) = self.visible_click_timeout {
            effective.ui.visible_click_timeout = timeout;
        }
        if let Some(fadeout) = self.no_press_fadeout {
            effective.ui.no_press_fadeout = fadeout;
        }
        if let Some(kbd_file) = &self.kbd_file {
            effective.devices.map = Some(kbd_file.clone());
        }
        if !self.devices.is_empty() {
            effective.devices.inputs.clone_from(&self.devices);
        }
        if self.no_event_log {
            effective.logging.event_log = false;
        }
        effective
    }

    /// Execute the run command
    pub fn execute(&self) -> Result<()> {
        println!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

        let mut config = Config::load().context("Failed to load configuration")?;
        if self.reset {
            println!("Resetting to defaults.");
            config = Config::default();
            config.save().context("Failed to save configuration")?;
        }

        let effective = self.apply(&config);
        effective.validate()?;

        let table = load_modmap(&effective)?;
        let inputs = if effective.devices.inputs.is_empty() {
            discover_devices()
        } else {
            effective.devices.inputs.clone()
        };

        let mut event_loop = EventLoop::new(
            EvdevSource::new(inputs),
            Arc::new(table),
            Indicator::new(IndicatorOptions::from(&effective.ui)),
            open_event_log(&effective.logging),
        );
        register_signals(&event_loop.stop_handle())?;
        event_loop
            .start()
            .context("Failed to start listening to input devices")?;

        let mut stdout = io::stdout();
        let result = event_loop.run(IDLE_SLEEP, |indicator| {
            if let Err(e) = draw_status(&mut stdout, indicator) {
                warn!("Failed to draw status: {e}");
            }
        });
        println!();

        result.context("Input device failure")?;
        Ok(())
    }
}

/// Feed a recorded event log through the monitor
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Event log file to replay
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Use this kbd (modmap) file
    #[arg(long = "kbdfile", value_name = "FILE")]
    pub kbd_file: Option<PathBuf>,

    /// Show only key combos (ex. Control-A)
    #[arg(long)]
    pub only_combo: bool,

    /// Sticky mode: modifiers stay shown until the next key is released
    #[arg(long)]
    pub sticky: bool,
}

impl ReplayArgs {
    /// Execute the replay command: one indicator line per change
    pub fn execute(&self) -> Result<()> {
        let mut config = Config::load().context("Failed to load configuration")?;
        config.ui.only_combo |= self.only_combo;
        config.ui.sticky_mode |= self.sticky;
        if let Some(kbd_file) = &self.kbd_file {
            config.devices.map = Some(kbd_file.clone());
        }

        let table = load_modmap(&config)?;
        let mut event_loop = EventLoop::new(
            ReplaySource::new(&self.log),
            Arc::new(table),
            Indicator::new(IndicatorOptions::from(&config.ui)),
            None,
        );
        event_loop
            .start()
            .context(format!("Failed to replay {}", self.log.display()))?;

        event_loop.run(Duration::ZERO, |indicator| println!("{}", indicator.render()))?;
        info!("Replayed {} events", event_loop.processed());
        Ok(())
    }
}

/// Loads the modmap the configuration points at, or the first usable candidate.
pub fn load_modmap(config: &Config) -> Result<ModTable> {
    let candidates = Config::kbd_files()?;
    let override_path = config.kbd_override(&candidates);
    Ok(read_mod_map_safely(override_path.as_deref(), &candidates))
}

/// Opens the event log if enabled. Failure only disables logging.
pub fn open_event_log(logging: &LoggingConfig) -> Option<EventLog> {
    if !logging.event_log {
        return None;
    }

    let dir = logging.log_dir();
    match EventLog::create_in(&dir) {
        Ok(log) => {
            println!("Logging into: {}", log.path().display());
            Some(log)
        }
        Err(e) => {
            warn!("Cannot create event log in {}: {e}", dir.display());
            None
        }
    }
}

fn register_signals(stop: &StopHandle) -> Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, stop.flag())
            .context("Failed to register signal handler")?;
    }
    Ok(())
}

fn draw_status<W: Write>(out: &mut W, indicator: &Indicator) -> io::Result<()> {
    let line = if indicator.is_visible() {
        indicator.render()
    } else {
        String::new()
    };
    execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let args = RunArgs {
            devices: vec![PathBuf::from("/dev/input/event3")],
            kbd_file: Some(PathBuf::from("de.kbd")),
            only_combo: true,
            no_press_fadeout: Some(2.0),
            no_event_log: true,
            ..RunArgs::default()
        };

        let base = Config::default();
        let effective = args.apply(&base);
        assert!(effective.ui.only_combo);
        assert!(!effective.ui.sticky_mode);
        assert!((effective.ui.no_press_fadeout - 2.0).abs() < f32::EPSILON);
        assert_eq!(effective.devices.map, Some(PathBuf::from("de.kbd")));
        assert_eq!(effective.devices.inputs, vec![PathBuf::from("/dev/input/event3")]);
        assert!(!effective.logging.event_log);
        // The stored config is untouched
        assert_eq!(base, Config::default());
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let mut config = Config::default();
        config.ui.sticky_mode = true;
        config.devices.inputs = vec![PathBuf::from("/dev/input/event1")];
        assert_eq!(RunArgs::default().apply(&config), config);
    }
}
