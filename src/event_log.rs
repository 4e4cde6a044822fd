//! Append-only diagnostic log of every device event.
//!
//! One line per event, `timestamp;event_type;code;value`, flushed after each
//! write. The timestamp is seconds since the Unix epoch with five decimals.

use crate::device::{DeviceEvent, EventKind};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name prefix for logs created with [`EventLog::create_in`].
pub const LOG_FILE_PREFIX: &str = "key-mon-log-";

/// Event log writer.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: File,
}

impl EventLog {
    /// Creates `dir/key-mon-log-YYYYmmdd-HHMMSS` (UTC), creating `dir` if needed.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!("{LOG_FILE_PREFIX}{}", Utc::now().format("%Y%m%d-%H%M%S"));
        Self::open(&dir.join(name))
    }

    /// Opens `path` for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an event stamped with the current time.
    pub fn record(&mut self, event: &DeviceEvent) -> io::Result<()> {
        let timestamp = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        self.record_at(timestamp, event)
    }

    /// Appends an event with an explicit timestamp.
    pub fn record_at(&mut self, timestamp: f64, event: &DeviceEvent) -> io::Result<()> {
        writeln!(self.file, "{}", format_line(timestamp, event))?;
        self.file.flush()
    }
}

/// Formats one log line (without the newline).
pub fn format_line(timestamp: f64, event: &DeviceEvent) -> String {
    format!(
        "{timestamp:.5};{};{};{}",
        event.kind, event.code, event.value
    )
}

/// Parses one log line back into its timestamp and event.
pub fn parse_line(line: &str) -> Result<(f64, DeviceEvent), String> {
    let fields: Vec<&str> = line.trim().split(';').collect();
    let [timestamp, kind, code, value] = fields.as_slice() else {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    };

    let timestamp = timestamp
        .parse::<f64>()
        .map_err(|_| format!("bad timestamp {timestamp:?}"))?;
    let kind = kind.parse::<EventKind>()?;
    let code = code
        .parse::<u16>()
        .map_err(|_| format!("bad code {code:?}"))?;
    let value = value
        .parse::<i32>()
        .map_err(|_| format!("bad value {value:?}"))?;

    Ok((timestamp, DeviceEvent::new(kind, code, value)))
}
