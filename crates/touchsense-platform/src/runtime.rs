//! Classifier runtime: owns a classifier on its own thread and fires its
//! timers in real time.
//!
//! The core classifier only learns about time when it is handed an event.
//! The runtime thread waits on its command channel until the classifier's
//! next deadline, so a held contact turns into a long touch without any
//! further input.

use crate::{PlatformError, PlatformResult};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use touchsense_core::{
    Classifier, ClassifierState, ContactEvent, DispatchError, GestureKind, RawContact, Surface,
};
use tracing::{debug, error, info, warn};

/// Commands sent to the runtime thread.
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Deliver a raw contact event.
    Contact(RawContact),
    /// Stop the runtime and unbind the classifier.
    Stop,
}

/// Events emitted by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RuntimeEvent {
    /// A gesture handler returned an error. The rest of that raw event or
    /// timer action was skipped.
    HandlerFailed {
        kind: GestureKind,
        index: usize,
        message: String,
    },
    /// The runtime thread exited.
    Stopped,
}

impl From<&DispatchError> for RuntimeEvent {
    fn from(err: &DispatchError) -> Self {
        RuntimeEvent::HandlerFailed {
            kind: err.kind,
            index: err.index,
            message: err.source.message.clone(),
        }
    }
}

/// Clonable entry point for raw contacts.
///
/// Events sent through `start`/`moved`/`end` are stamped with the runtime
/// clock (milliseconds since the runtime was spawned).
#[derive(Debug, Clone)]
pub struct ContactSink {
    cmd_tx: Sender<RuntimeCommand>,
    epoch: Instant,
}

impl ContactSink {
    /// Current time on the runtime clock.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn start(&self, x: f32, y: f32) -> PlatformResult<()> {
        self.send(RawContact::start(self.now_ms(), x, y))
    }

    pub fn moved(&self, x: f32, y: f32) -> PlatformResult<()> {
        self.send(RawContact::moved(self.now_ms(), x, y))
    }

    pub fn end(&self, x: f32, y: f32) -> PlatformResult<()> {
        self.send(RawContact::end(self.now_ms(), x, y))
    }

    /// Deliver a pre-stamped event. The timestamp must be on the runtime
    /// clock (see [`ContactSink::now_ms`]).
    pub fn send(&self, raw: RawContact) -> PlatformResult<()> {
        self.cmd_tx
            .send(RuntimeCommand::Contact(raw))
            .map_err(|_| PlatformError::Detached)
    }
}

/// Handle to control the runtime thread.
pub struct RuntimeHandle {
    sink: ContactSink,
    event_rx: Receiver<RuntimeEvent>,
    state: Arc<Mutex<ClassifierState>>,
    thread: Option<JoinHandle<Arc<dyn Surface>>>,
}

impl RuntimeHandle {
    /// A sender for raw contacts. Clone it freely.
    pub fn sink(&self) -> ContactSink {
        self.sink.clone()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Option<RuntimeEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Receive all pending events.
    pub fn drain(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Classifier state after the last processed event or timer.
    pub fn state(&self) -> ClassifierState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    /// Stop the runtime, wait for it, and get the surface back.
    ///
    /// Contacts already queued are processed first. Pending timers are
    /// dropped without firing.
    pub fn shutdown(mut self) -> PlatformResult<Arc<dyn Surface>> {
        let _ = self.sink.cmd_tx.send(RuntimeCommand::Stop);
        match self.thread.take() {
            Some(handle) => handle.join().map_err(|_| PlatformError::RuntimePanicked),
            None => Err(PlatformError::Detached),
        }
    }
}

impl Drop for RuntimeHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.sink.cmd_tx.send(RuntimeCommand::Stop);
        }
    }
}

/// Runtime: runs in a separate thread, owns the classifier.
pub struct SurfaceRuntime {
    classifier: Classifier<ContactEvent>,
    epoch: Instant,
    cmd_rx: Receiver<RuntimeCommand>,
    event_tx: Sender<RuntimeEvent>,
    state: Arc<Mutex<ClassifierState>>,
}

impl SurfaceRuntime {
    /// Move a bound classifier (handlers registered) onto a runtime thread.
    pub fn spawn(classifier: Classifier<ContactEvent>) -> RuntimeHandle {
        let (cmd_tx, cmd_rx) = bounded(256);
        let (event_tx, event_rx) = bounded(64);
        let state = Arc::new(Mutex::new(classifier.state()));
        let epoch = Instant::now();

        let runtime = SurfaceRuntime {
            classifier,
            epoch,
            cmd_rx,
            event_tx,
            state: state.clone(),
        };

        let thread = thread::spawn(move || runtime.run_loop());

        RuntimeHandle {
            sink: ContactSink { cmd_tx, epoch },
            event_rx,
            state,
            thread: Some(thread),
        }
    }

    fn run_loop(mut self) -> Arc<dyn Surface> {
        info!(surface = %self.classifier.surface().label(), "Classifier runtime started");

        loop {
            let cmd = match self.classifier.next_deadline() {
                Some(deadline) => {
                    let at = self.epoch + Duration::from_millis(deadline);
                    match self.cmd_rx.recv_deadline(at) {
                        Ok(cmd) => Some(cmd),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.cmd_rx.recv() {
                    Ok(cmd) => Some(cmd),
                    // All senders gone, nothing can arrive any more.
                    Err(_) => break,
                },
            };

            let result = match cmd {
                None => {
                    let now = self.now_ms();
                    debug!(now, "timer due");
                    self.classifier.advance(now)
                }
                Some(RuntimeCommand::Contact(raw)) => self.classifier.handle(raw),
                Some(RuntimeCommand::Stop) => break,
            };

            if let Err(err) = result {
                error!(
                    kind = %err.kind,
                    index = err.index,
                    "gesture handler failed: {}",
                    err.source
                );
                self.emit(RuntimeEvent::from(&err));
            }
            self.publish_state();
        }

        self.emit(RuntimeEvent::Stopped);
        info!("Classifier runtime exiting");
        self.classifier.unbind()
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn publish_state(&self) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = self.classifier.state();
        }
    }

    fn emit(&self, event: RuntimeEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to emit runtime event: {}", e);
        }
    }
}
