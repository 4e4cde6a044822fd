//! Replays a recorded event log as if it came from a device.

use super::{DeviceError, DeviceEvent, EventSource};
use crate::event_log;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Event source reading an event log written by [`crate::event_log::EventLog`].
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    events: VecDeque<DeviceEvent>,
    started: bool,
    stopped: bool,
}

impl ReplaySource {
    /// Creates a replay of `path`. The file is read by `start`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            events: VecDeque::new(),
            started: false,
            stopped: false,
        }
    }
}

impl EventSource for ReplaySource {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.started {
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| DeviceError::Open {
            path: self.path.clone(),
            source,
        })?;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (_, event) = event_log::parse_line(line)
                .map_err(|reason| DeviceError::Malformed { line: idx + 1, reason })?;
            self.events.push_back(event);
        }

        debug!(
            "Replaying {} events from {}",
            self.events.len(),
            self.path.display()
        );
        self.started = true;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        if self.stopped {
            return Ok(None);
        }
        Ok(self.events.pop_front())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.events.clear();
    }

    fn is_exhausted(&self) -> bool {
        self.stopped || (self.started && self.events.is_empty())
    }
}
