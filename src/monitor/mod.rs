//! The polling loop: drain device events, resolve them, update the indicator.
//!
//! The loop is single-threaded and cooperative. Each [`EventLoop::step`]
//! checks the stop flag, pulls at most one event without blocking, processes
//! it, and advances the indicator timers. [`EventLoop::run`] drives steps
//! until the loop stops.

pub mod indicator;

pub use indicator::{Indicator, IndicatorOptions, Modifier};

use crate::device::{names, DeviceError, DeviceEvent, EventKind, EventSource};
use crate::event_log::EventLog;
use crate::modmap::{ModTable, Resolved};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Sleep between steps when no event was queued.
pub const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Loop lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Polling
    Running,
    /// Finished; the source has been released
    Stopped,
}

/// Event classes that have handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Keyboard key
    Key,
    /// Mouse button
    Button,
    /// Relative motion
    Motion,
}

impl EventClass {
    /// Class of an event kind; `None` for kinds nothing handles.
    pub fn of(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Key => Some(Self::Key),
            EventKind::Button => Some(Self::Button),
            EventKind::Motion => Some(Self::Motion),
            EventKind::Sync | EventKind::Other(_) => None,
        }
    }
}

type Handler<S> = fn(&mut EventLoop<S>, &DeviceEvent, Instant) -> bool;

/// Shared flag used to ask the loop to stop from outside (signal handlers, other threads).
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Asks the loop to stop at the top of its next step.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The underlying flag, for `signal_hook::flag::register`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// What one step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Event processed in this step, if any
    pub event: Option<DeviceEvent>,
    /// True when the indicator display changed
    pub changed: bool,
    /// Loop state after the step
    pub state: LoopState,
}

/// Single-threaded device event loop.
pub struct EventLoop<S: EventSource> {
    source: Option<S>,
    modmap: Arc<ModTable>,
    indicator: Indicator,
    event_log: Option<EventLog>,
    handlers: HashMap<EventClass, Handler<S>>,
    state: LoopState,
    stop: StopHandle,
    failure: Option<DeviceError>,
    last_resolved: Option<Resolved>,
    processed: u64,
}

impl<S: EventSource> EventLoop<S> {
    /// Creates a loop. The source is not started until [`EventLoop::start`].
    pub fn new(
        source: S,
        modmap: Arc<ModTable>,
        indicator: Indicator,
        event_log: Option<EventLog>,
    ) -> Self {
        let mut handlers: HashMap<EventClass, Handler<S>> = HashMap::new();
        handlers.insert(EventClass::Key, Self::handle_key);
        handlers.insert(EventClass::Button, Self::handle_key);
        handlers.insert(EventClass::Motion, Self::handle_motion);

        Self {
            source: Some(source),
            modmap,
            indicator,
            event_log,
            handlers,
            state: LoopState::Running,
            stop: StopHandle::default(),
            failure: None,
            last_resolved: None,
            processed: 0,
        }
    }

    /// Starts the source. On failure the loop is stopped and the error returned.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        if let Err(e) = source.start() {
            error!("Failed to start input source: {e}");
            self.stop();
            return Err(e);
        }
        Ok(())
    }

    /// Pulls at most one pending event without blocking.
    ///
    /// Returns `None` when stopped or when nothing is queued. A device error
    /// stops the loop and is kept for [`EventLoop::take_failure`].
    pub fn poll_once(&mut self) -> Option<DeviceEvent> {
        if self.state == LoopState::Stopped {
            return None;
        }
        let source = self.source.as_mut()?;

        match source.next_event() {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                if source.is_exhausted() {
                    debug!("Input source exhausted");
                    self.stop();
                }
                None
            }
            Err(e) => {
                error!("Input device failed: {e}");
                self.failure = Some(e);
                self.stop();
                None
            }
        }
    }

    /// Logs an event and dispatches it. Returns true if the indicator changed.
    ///
    /// Every event is logged; only key, button and motion events have handlers.
    pub fn process(&mut self, event: &DeviceEvent, now: Instant) -> bool {
        self.processed += 1;

        if let Some(log) = self.event_log.as_mut() {
            if let Err(e) = log.record(event) {
                warn!(
                    "Failed to write event log {}: {e}; event logging disabled",
                    log.path().display()
                );
                self.event_log = None;
            }
        }

        let Some(handler) = EventClass::of(event.kind).and_then(|c| self.handlers.get(&c)).copied()
        else {
            return false;
        };
        handler(self, event, now)
    }

    /// One cooperative step: stop check, poll, process, timers.
    pub fn step(&mut self, now: Instant) -> StepOutcome {
        if self.stop.is_stop_requested() {
            self.stop();
        }
        if self.state == LoopState::Stopped {
            return StepOutcome {
                event: None,
                changed: false,
                state: self.state,
            };
        }

        let event = self.poll_once();
        let mut changed = match &event {
            Some(event) => self.process(event, now),
            None => false,
        };
        changed |= self.indicator.tick(now);

        StepOutcome {
            event,
            changed,
            state: self.state,
        }
    }

    /// Runs steps until the loop stops, calling `on_change` after each display change.
    ///
    /// Sleeps `idle` between steps that found no event. Returns the device
    /// error if that is what stopped the loop.
    pub fn run<F>(&mut self, idle: Duration, mut on_change: F) -> Result<(), DeviceError>
    where
        F: FnMut(&Indicator),
    {
        while self.state == LoopState::Running {
            let outcome = self.step(Instant::now());
            if outcome.changed {
                on_change(&self.indicator);
            }
            if outcome.event.is_none() && outcome.state == LoopState::Running && !idle.is_zero() {
                thread::sleep(idle);
            }
        }

        info!("Event loop stopped after {} events", self.processed);
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Stops the loop and releases the source. Calling it again has no effect.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        if let Some(mut source) = self.source.take() {
            source.stop();
        }
        debug!("Event loop stopped");
    }

    /// Replaces the modmap between steps.
    pub fn reload_modmap(&mut self, modmap: Arc<ModTable>) {
        info!("Reloaded modmap with {} entries", modmap.len());
        self.modmap = modmap;
    }

    /// Handle that requests a stop from outside the loop.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Indicator state.
    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Modmap in use.
    pub fn modmap(&self) -> &Arc<ModTable> {
        &self.modmap
    }

    /// Most recent key/button resolution.
    pub fn last_resolved(&self) -> Option<&Resolved> {
        self.last_resolved.as_ref()
    }

    /// Number of events processed so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// The source, until the loop stops and releases it.
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Mutable access to the source, until the loop stops.
    pub fn source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }

    /// Event log, if enabled.
    pub fn event_log(&self) -> Option<&EventLog> {
        self.event_log.as_ref()
    }

    /// Takes the device error that stopped the loop, if any.
    pub fn take_failure(&mut self) -> Option<DeviceError> {
        self.failure.take()
    }

    fn handle_key(&mut self, event: &DeviceEvent, now: Instant) -> bool {
        let fallback = names::key_name(event.code).unwrap_or_default();
        let resolved = self.modmap.lookup(u32::from(event.code), &fallback);
        if !resolved.mapped {
            debug!("No mapping for scan code {}", event.code);
        }
        debug!(
            "Scan code {}, key {} value {} ({})",
            event.code, resolved.code, event.value, resolved.medium_label
        );

        let changed = self.indicator.key(&resolved, event.value, now);
        self.last_resolved = Some(resolved);
        changed
    }

    fn handle_motion(&mut self, event: &DeviceEvent, now: Instant) -> bool {
        match names::rel_name(event.code) {
            Some(axis) => self.indicator.scroll(axis, event.value, now),
            None => false,
        }
    }
}

impl<S: EventSource> Drop for EventLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
