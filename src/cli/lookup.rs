//! `key-mon lookup`: resolve one scan code through the modmap.

use crate::cli::run::load_modmap;
use crate::config::Config;
use crate::device::names;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Resolve a scan code to its symbolic name and labels
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Raw scan code
    #[arg(value_name = "SCAN_CODE")]
    scan_code: u32,

    /// Fallback name used when the modmap has no entry (defaults to the kernel name)
    #[arg(value_name = "FALLBACK")]
    fallback: Option<String>,

    /// Use this kbd (modmap) file
    #[arg(long = "kbdfile", value_name = "FILE")]
    kbd_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct LookupOutput {
    scan_code: u32,
    code: String,
    medium_label: String,
    short_label: String,
    mapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    modmap: Option<String>,
}

impl LookupArgs {
    /// Execute lookup command
    pub fn execute(&self) -> Result<()> {
        let mut config = Config::load().unwrap_or_else(|e| {
            warn!("Ignoring unusable configuration: {e:#}");
            Config::default()
        });
        if let Some(kbd_file) = &self.kbd_file {
            config.devices.map = Some(kbd_file.clone());
        }

        let table = load_modmap(&config)?;
        let fallback = match &self.fallback {
            Some(name) => name.clone(),
            None => u16::try_from(self.scan_code)
                .ok()
                .and_then(names::key_name)
                .unwrap_or_default(),
        };
        let resolved = table.lookup(self.scan_code, &fallback);

        if self.json {
            let output = LookupOutput {
                scan_code: self.scan_code,
                code: resolved.code,
                medium_label: resolved.medium_label,
                short_label: resolved.short_label,
                mapped: resolved.mapped,
                modmap: table.source().map(|p| p.display().to_string()),
            };
            let json = serde_json::to_string_pretty(&output)
                .context("Failed to serialize lookup result")?;
            println!("{json}");
        } else {
            println!(
                "{}\t{}\t{}",
                resolved.code, resolved.medium_label, resolved.short_label
            );
        }

        Ok(())
    }
}
