//! Linux event devices, read through the `evdev` crate.
//!
//! Every device is opened non-blocking and drained from the loop thread, so
//! `next_event` never waits and `stop` closes the handles immediately.

use super::{DeviceError, DeviceEvent, EventSource};
use evdev::{Device, InputEvent, KeyCode, RelativeAxisCode};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Converts an `evdev` event into the monitor's event type.
pub fn from_input_event(event: &InputEvent) -> DeviceEvent {
    DeviceEvent::from_raw(event.event_type().0, event.code(), event.value())
}

/// Keyboards and mice among the event devices the current user can open, sorted by path.
pub fn discover_devices() -> Vec<PathBuf> {
    let mut devices: Vec<PathBuf> = evdev::enumerate()
        .filter(|(path, device)| {
            let wanted = is_keyboard(device) || is_mouse(device);
            if !wanted {
                debug!("Ignoring input device {}", path.display());
            }
            wanted
        })
        .map(|(path, _)| path)
        .collect();
    devices.sort();
    devices
}

fn is_keyboard(device: &Device) -> bool {
    device
        .supported_keys()
        .is_some_and(|keys| keys.contains(KeyCode::KEY_A) && keys.contains(KeyCode::KEY_ENTER))
}

fn is_mouse(device: &Device) -> bool {
    let has_buttons = device
        .supported_keys()
        .is_some_and(|keys| keys.contains(KeyCode::BTN_LEFT));
    let has_motion = device.supported_relative_axes().is_some_and(|axes| {
        axes.contains(RelativeAxisCode::REL_X) || axes.contains(RelativeAxisCode::REL_WHEEL)
    });
    has_buttons && has_motion
}

fn set_nonblocking(device: &Device) -> nix::Result<()> {
    let fd = device.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// An open, non-blocking input handle.
trait InputHandle {
    /// Appends whatever events are ready. Must not block.
    fn fetch_into(&mut self, out: &mut VecDeque<DeviceEvent>) -> io::Result<()>;
}

impl InputHandle for Device {
    fn fetch_into(&mut self, out: &mut VecDeque<DeviceEvent>) -> io::Result<()> {
        match self.fetch_events() {
            Ok(events) => {
                out.extend(events.map(|event| from_input_event(&event)));
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }
}

struct OpenDevice {
    path: PathBuf,
    handle: Box<dyn InputHandle>,
}

/// Event source backed by one or more Linux event devices.
pub struct EvdevSource {
    paths: Vec<PathBuf>,
    devices: Vec<OpenDevice>,
    pending: VecDeque<DeviceEvent>,
    listening: bool,
}

impl fmt::Debug for EvdevSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvdevSource")
            .field("paths", &self.paths)
            .field("open_devices", &self.devices.len())
            .field("pending", &self.pending.len())
            .field("listening", &self.listening)
            .finish()
    }
}

impl EvdevSource {
    /// Creates a source for the given device paths. Nothing is opened until `start`.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            devices: Vec::new(),
            pending: VecDeque::new(),
            listening: false,
        }
    }

    fn open(path: &Path) -> Result<OpenDevice, DeviceError> {
        let device = Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        set_nonblocking(&device).map_err(|errno| DeviceError::Open {
            path: path.to_path_buf(),
            source: io::Error::from(errno),
        })?;
        debug!(
            "Opened {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed device")
        );
        Ok(OpenDevice {
            path: path.to_path_buf(),
            handle: Box::new(device),
        })
    }

    /// Device paths this source listens to.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// True between `start` and `stop`.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of device handles currently held open.
    pub fn open_devices(&self) -> usize {
        self.devices.len()
    }
}

impl EventSource for EvdevSource {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.listening {
            return Ok(());
        }
        if self.paths.is_empty() {
            return Err(DeviceError::NoDevices);
        }

        // All or nothing: a bad path drops the handles opened so far
        let devices = self
            .paths
            .iter()
            .map(|path| Self::open(path))
            .collect::<Result<Vec<_>, _>>()?;
        self.devices = devices;
        self.listening = true;

        info!("Listening on {} input device(s)", self.devices.len());
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        if !self.listening {
            return Ok(None);
        }
        if self.pending.is_empty() {
            for device in &mut self.devices {
                device
                    .handle
                    .fetch_into(&mut self.pending)
                    .map_err(|source| DeviceError::Read {
                        path: device.path.clone(),
                        source,
                    })?;
            }
        }
        Ok(self.pending.pop_front())
    }

    fn stop(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        self.pending.clear();
        // Dropping the handles closes the device files
        self.devices.clear();
        info!("Stopped listening on {} input device(s)", self.paths.len());
    }
}

impl Drop for EvdevSource {
    fn drop(&mut self) {
        self.stop();
    }
}
