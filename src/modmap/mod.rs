//! Modmap: translation of raw scan codes into symbolic key identifiers.
//!
//! A modmap (`.kbd`) file declares one scan code per line:
//!
//! ```text
//! # scan code; symbolic name; medium label; short label
//! 30;KEY_A;A;A
//! 42;KEY_LEFTSHIFT;Shift
//! 57;KEY_SPACE
//! ```
//!
//! Labels are optional. `\;` and `\\` escape the separator and the backslash.
//! Tables are immutable once built; reloading produces a new table.

pub mod resolve;

pub use resolve::{display_label, normalize_name, synthesize, Resolved};

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// US layout modmap shipped with the binary.
pub const BUNDLED_US_KBD: &str = include_str!("us.kbd");

/// Errors raised while loading a modmap file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file does not exist
    #[error("modmap file not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },
    /// The file exists but could not be read as UTF-8 text
    #[error("failed to read modmap file {}: {source}", path.display())]
    Unreadable {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Reason a single modmap line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// First field is not a non-negative integer
    #[error("scan code {0:?} is not an integer")]
    BadScanCode(String),
    /// Second field is absent or empty
    #[error("missing symbolic name")]
    MissingName,
    /// More than four fields
    #[error("expected at most 4 fields, found {0}")]
    TooManyFields(usize),
    /// Scan code already declared earlier in the file (later line wins)
    #[error("scan code {code} already declared on line {first_line}")]
    Duplicate {
        /// Scan code
        code: u32,
        /// Line of the earlier declaration
        first_line: usize,
    },
}

/// A problem found on one line while loading a modmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    /// 1-based line number
    pub line: usize,
    /// What was wrong
    pub error: LineError,
}

/// One scan code's identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModEntry {
    /// Raw scan code emitted by the device driver
    pub scan_code: u32,
    /// Layout-independent name (e.g. "KEY_A")
    pub symbolic_name: String,
    /// Medium-length label
    pub medium_label: String,
    /// Short label
    pub short_label: String,
}

impl ModEntry {
    fn resolved(&self) -> Resolved {
        Resolved {
            code: self.symbolic_name.clone(),
            medium_label: self.medium_label.clone(),
            short_label: self.short_label.clone(),
            mapped: true,
        }
    }
}

/// Read-only scan code table.
#[derive(Debug, Clone, Default)]
pub struct ModTable {
    entries: HashMap<u32, ModEntry>,
    source: Option<PathBuf>,
    warnings: Vec<LineWarning>,
}

impl ModTable {
    /// An empty table; every lookup goes through fallback synthesis.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses modmap text. Malformed lines are skipped and recorded as warnings.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut first_lines: HashMap<u32, usize> = HashMap::new();
        let mut warnings = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Ok(entry) => {
                    if let Some(&first_line) = first_lines.get(&entry.scan_code) {
                        warnings.push(LineWarning {
                            line: line_no,
                            error: LineError::Duplicate {
                                code: entry.scan_code,
                                first_line,
                            },
                        });
                    } else {
                        first_lines.insert(entry.scan_code, line_no);
                    }
                    entries.insert(entry.scan_code, entry);
                }
                Err(error) => warnings.push(LineWarning {
                    line: line_no,
                    error,
                }),
            }
        }

        Self {
            entries,
            source: None,
            warnings,
        }
    }

    /// Loads a modmap file.
    ///
    /// Fails only when the file is absent or unreadable; bad lines become
    /// warnings (also emitted through `tracing`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut table = Self::parse(&text);
        for warning in &table.warnings {
            warn!(
                "{}:{}: skipped modmap line: {}",
                path.display(),
                warning.line,
                warning.error
            );
        }
        debug!(
            "Loaded {} modmap entries from {}",
            table.len(),
            path.display()
        );
        table.source = Some(path.to_path_buf());
        Ok(table)
    }

    /// Resolves a scan code, synthesizing an entry from `fallback_name` when unmapped.
    pub fn lookup(&self, scan_code: u32, fallback_name: &str) -> Resolved {
        match self.entries.get(&scan_code) {
            Some(entry) => {
                if !fallback_name.is_empty() && normalize_name(fallback_name) != entry.symbolic_name {
                    debug!(
                        "Scan code {} maps to {} (binding says {})",
                        scan_code, entry.symbolic_name, fallback_name
                    );
                }
                entry.resolved()
            }
            None => synthesize(scan_code, fallback_name),
        }
    }

    /// Gets the raw entry for a scan code.
    pub fn get(&self, scan_code: u32) -> Option<&ModEntry> {
        self.entries.get(&scan_code)
    }

    /// Entries sorted by scan code.
    pub fn entries(&self) -> Vec<&ModEntry> {
        let mut entries: Vec<&ModEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.scan_code);
        entries
    }

    /// Number of mapped scan codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File the table was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Lines skipped or overridden while loading.
    pub fn warnings(&self) -> &[LineWarning] {
        &self.warnings
    }
}

/// Loads the override if given, else the first candidate that loads.
///
/// Never fails: when nothing can be loaded a warning is logged and an empty
/// table is returned, so every key resolves through fallback synthesis.
pub fn read_mod_map_safely(override_path: Option<&Path>, candidates: &[PathBuf]) -> ModTable {
    if let Some(path) = override_path {
        match ModTable::load(path) {
            Ok(table) => {
                info!("Using modmap {}", path.display());
                return table;
            }
            Err(e) => {
                warn!("{e}; using an empty modmap");
                return ModTable::empty();
            }
        }
    }

    for path in candidates {
        match ModTable::load(path) {
            Ok(table) => {
                info!("Using modmap {}", path.display());
                return table;
            }
            Err(e) => debug!("Skipping modmap candidate: {e}"),
        }
    }

    warn!(
        "No usable modmap among {} candidate(s); using an empty modmap",
        candidates.len()
    );
    ModTable::empty()
}

fn parse_line(line: &str) -> Result<ModEntry, LineError> {
    let fields = split_fields(line);
    if fields.len() > 4 {
        return Err(LineError::TooManyFields(fields.len()));
    }

    let scan_code = fields[0]
        .parse::<u32>()
        .map_err(|_| LineError::BadScanCode(fields[0].clone()))?;

    let symbolic_name = fields
        .get(1)
        .filter(|name| !name.is_empty())
        .cloned()
        .ok_or(LineError::MissingName)?;

    let medium_label = fields
        .get(2)
        .filter(|label| !label.is_empty())
        .cloned()
        .unwrap_or_else(|| display_label(&symbolic_name).to_string());

    let short_label = fields
        .get(3)
        .filter(|label| !label.is_empty())
        .cloned()
        .unwrap_or_else(|| medium_label.clone());

    Ok(ModEntry {
        scan_code,
        symbolic_name,
        medium_label,
        short_label,
    })
}

/// Splits on unescaped `;` and trims each field.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ';' => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}
