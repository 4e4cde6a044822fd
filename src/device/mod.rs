//! Input device events and the sources that produce them.
//!
//! The monitor only depends on the three-method [`EventSource`] contract.
//! Concrete sources read Linux event devices ([`kernel::EvdevSource`]),
//! replay a recorded event log ([`replay::ReplaySource`]), or serve an
//! in-memory queue ([`QueueSource`]).

pub mod kernel;
pub mod names;
pub mod replay;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Synchronization event type.
pub const EV_SYN: u16 = 0x00;
/// Key or button event type.
pub const EV_KEY: u16 = 0x01;
/// Relative axis event type.
pub const EV_REL: u16 = 0x02;

/// First button code; codes below are keys.
pub const BTN_MISC: u16 = 0x100;
/// First key code after the button range.
pub const KEY_OK: u16 = 0x160;

/// Horizontal wheel axis.
pub const REL_HWHEEL: u16 = 0x06;
/// Vertical wheel axis.
pub const REL_WHEEL: u16 = 0x08;

/// Key/button value for a release.
pub const RELEASE: i32 = 0;
/// Key/button value for a press.
pub const PRESS: i32 = 1;
/// Key/button value for an autorepeat.
pub const REPEAT: i32 = 2;

/// Errors raised by input device sources.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device could not be opened
    #[error("failed to open input device {}: {source}", path.display())]
    Open {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Reading from an open device failed
    #[error("failed to read from input device {}: {source}", path.display())]
    Read {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// No device to listen to
    #[error("no input devices found")]
    NoDevices,
    /// Every reader has gone away
    #[error("input device disconnected")]
    Disconnected,
    /// A recorded event line could not be decoded
    #[error("malformed event record on line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },
}

/// Kind of a device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Keyboard key
    Key,
    /// Mouse or joystick button
    Button,
    /// Relative motion, including wheels
    Motion,
    /// End-of-packet marker
    Sync,
    /// Any other raw event type
    Other(u16),
}

impl EventKind {
    /// Classifies a raw `(type, code)` pair.
    pub fn from_raw(ev_type: u16, code: u16) -> Self {
        match ev_type {
            EV_SYN => Self::Sync,
            EV_KEY if (BTN_MISC..KEY_OK).contains(&code) => Self::Button,
            EV_KEY => Self::Key,
            EV_REL => Self::Motion,
            other => Self::Other(other),
        }
    }

    /// Raw event type number.
    pub fn raw_type(self) -> u16 {
        match self {
            Self::Sync => EV_SYN,
            Self::Key | Self::Button => EV_KEY,
            Self::Motion => EV_REL,
            Self::Other(t) => t,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Button => f.write_str("button"),
            Self::Motion => f.write_str("motion"),
            Self::Sync => f.write_str("sync"),
            Self::Other(t) => write!(f, "type{t}"),
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key" => Ok(Self::Key),
            "button" => Ok(Self::Button),
            "motion" => Ok(Self::Motion),
            "sync" => Ok(Self::Sync),
            other => other
                .strip_prefix("type")
                .and_then(|n| n.parse::<u16>().ok())
                .map(Self::Other)
                .ok_or_else(|| format!("unknown event type {other:?}")),
        }
    }
}

/// One event read from an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceEvent {
    /// Event kind
    pub kind: EventKind,
    /// Key, button or axis code
    pub code: u16,
    /// Press/release/repeat for keys, delta for motion
    pub value: i32,
}

impl DeviceEvent {
    /// Creates an event.
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Creates an event from raw kernel fields.
    pub fn from_raw(ev_type: u16, code: u16, value: i32) -> Self {
        Self::new(EventKind::from_raw(ev_type, code), code, value)
    }

    /// Key press shorthand.
    pub fn key(code: u16, value: i32) -> Self {
        Self::from_raw(EV_KEY, code, value)
    }

    /// Relative motion shorthand.
    pub fn motion(code: u16, value: i32) -> Self {
        Self::new(EventKind::Motion, code, value)
    }
}

/// A source of device events.
///
/// `next_event` never blocks; `Ok(None)` means nothing is queued right now.
pub trait EventSource {
    /// Starts listening.
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Returns the next queued event, if any.
    fn next_event(&mut self) -> Result<Option<DeviceEvent>, DeviceError>;

    /// Stops listening and releases the device. Calling it again has no effect.
    fn stop(&mut self);

    /// True once the source can never produce another event.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn start(&mut self) -> Result<(), DeviceError> {
        (**self).start()
    }

    fn next_event(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        (**self).next_event()
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// In-memory event queue.
#[derive(Debug, Default)]
pub struct QueueSource {
    events: VecDeque<DeviceEvent>,
    started: bool,
    stopped: bool,
}

impl QueueSource {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue pre-filled with events.
    pub fn from_events(events: impl IntoIterator<Item = DeviceEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Appends an event.
    pub fn push(&mut self, event: DeviceEvent) {
        self.events.push_back(event);
    }

    /// Number of events not yet consumed.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// True after `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl EventSource for QueueSource {
    fn start(&mut self) -> Result<(), DeviceError> {
        self.started = true;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        if !self.started || self.stopped {
            return Ok(None);
        }
        Ok(self.events.pop_front())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.events.clear();
    }
}
