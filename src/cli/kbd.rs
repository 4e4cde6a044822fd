//! `key-mon kbd`: inspect and install modmap files.

use crate::config::Config;
use crate::constants::{APP_BINARY_NAME, BUNDLED_KBD_NAME};
use crate::modmap::{ModTable, BUNDLED_US_KBD};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use tracing::warn;

/// Modmap file commands
#[derive(Args, Debug)]
pub struct KbdArgs {
    #[command(subcommand)]
    command: KbdCommand,
}

#[derive(Subcommand, Debug)]
enum KbdCommand {
    /// List candidate modmap files in search order
    List(KbdListArgs),
    /// Write the bundled US modmap into the config directory
    Install(KbdInstallArgs),
}

/// List candidate modmap files
#[derive(Args, Debug)]
pub struct KbdListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Install the bundled modmap
#[derive(Args, Debug)]
pub struct KbdInstallArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Serialize, Debug)]
struct CandidateOutput {
    path: String,
    selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl KbdArgs {
    /// Execute kbd subcommand
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            KbdCommand::List(args) => args.execute(),
            KbdCommand::Install(args) => args.execute(),
        }
    }
}

impl KbdListArgs {
    /// Execute list command
    pub fn execute(&self) -> Result<()> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!("Ignoring unusable configuration: {e:#}");
            Config::default()
        });
        let mut paths = Config::kbd_files()?;
        let override_path = config.kbd_override(&paths);
        if let Some(path) = &override_path {
            if !paths.contains(path) {
                paths.insert(0, path.clone());
            }
        }

        let mut selected_any = false;
        let candidates: Vec<CandidateOutput> = paths
            .iter()
            .map(|path| {
                let is_eligible = override_path.as_ref().map_or(true, |o| o == path);
                match ModTable::load(path) {
                    Ok(table) => {
                        let selected = is_eligible && !selected_any;
                        selected_any |= selected;
                        CandidateOutput {
                            path: path.display().to_string(),
                            selected,
                            entries: Some(table.len()),
                            warnings: Some(table.warnings().len()),
                            error: None,
                        }
                    }
                    Err(e) => CandidateOutput {
                        path: path.display().to_string(),
                        selected: false,
                        entries: None,
                        warnings: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect();

        if self.json {
            let json = serde_json::to_string_pretty(&candidates)
                .context("Failed to serialize candidate list")?;
            println!("{json}");
            return Ok(());
        }

        if candidates.is_empty() {
            println!("No modmap files found. Search path:");
            for dir in Config::kbd_search_dirs()? {
                println!("  - {}", dir.display());
            }
            println!();
            println!("Run `{APP_BINARY_NAME} kbd install` to install the bundled US modmap.");
            return Ok(());
        }

        for candidate in &candidates {
            let marker = if candidate.selected { "*" } else { " " };
            match (&candidate.entries, &candidate.error) {
                (Some(entries), _) => println!(
                    "{marker} {} ({entries} entries, {} warnings)",
                    candidate.path,
                    candidate.warnings.unwrap_or(0)
                ),
                (None, Some(error)) => println!("{marker} {} (error: {error})", candidate.path),
                (None, None) => println!("{marker} {}", candidate.path),
            }
        }
        Ok(())
    }
}

impl KbdInstallArgs {
    /// Execute install command
    pub fn execute(&self) -> Result<()> {
        let dir = Config::config_dir()?;
        let path = dir.join(BUNDLED_KBD_NAME);
        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }

        fs::create_dir_all(&dir)
            .context(format!("Failed to create config directory: {}", dir.display()))?;
        fs::write(&path, BUNDLED_US_KBD)
            .context(format!("Failed to write modmap: {}", path.display()))?;

        println!("Installed {}", path.display());
        Ok(())
    }
}
