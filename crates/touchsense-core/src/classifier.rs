//! Gesture classifier: single-contact state machine.
//!
//! Per contact lifecycle the classifier moves `Idle -> Down -> (LongPressed |
//! Released)`. A tap leaves a double-tap window open that the next contact
//! start may consume.
//!
//! All entry points take the host's current time in milliseconds. Timers
//! that expired before that instant fire first, in deadline order, exactly as
//! a host event loop would have run them ahead of the raw event.

use crate::error::{BindError, DispatchResult, HandlerResult};
use crate::event::{ContactEvent, ContactPhase, RawContact};
use crate::registry::{Callback, CallbackRegistry};
use crate::surface::{self, Surface};
use crate::timer::{Expired, TimingController};
use crate::{ClassifierConfig, GestureKind, HandlerOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Observable snapshot of the classifier's mode state and timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierState {
    /// A contact is down and has not moved or turned into a long touch.
    pub is_touching: bool,
    /// Drag mode is engaged.
    pub is_dragging: bool,
    /// Deadline of the pending long-press timer.
    pub long_press_deadline: Option<u64>,
    /// Deadline of the open double-tap window.
    pub double_tap_deadline: Option<u64>,
}

/// Gesture classifier bound to one contact surface.
///
/// `E` is the host's raw event payload. It is forwarded to handlers
/// untouched; the long-press timer keeps the payload of the contact start
/// that armed it.
pub struct Classifier<E> {
    surface: Arc<dyn Surface>,
    config: ClassifierConfig,
    registry: CallbackRegistry<E>,
    timers: TimingController<E>,
    is_touching: bool,
    is_dragging: bool,
}

impl<E> Classifier<E> {
    /// Bind a classifier with default timings.
    pub fn bind(surface: Arc<dyn Surface>) -> Result<Self, BindError> {
        Self::bind_with_config(surface, ClassifierConfig::default())
    }

    /// Bind a classifier. Fails if `surface` is not renderable or a timing
    /// in `config` is zero.
    pub fn bind_with_config(
        surface: Arc<dyn Surface>,
        config: ClassifierConfig,
    ) -> Result<Self, BindError> {
        surface::validate(surface.as_ref())?;
        config
            .validate()
            .map_err(|err| BindError::InvalidConfig(err.to_string()))?;
        info!(surface = %surface.label(), ?config, "gesture classifier bound");

        Ok(Self {
            surface,
            config,
            registry: CallbackRegistry::new(),
            timers: TimingController::new(),
            is_touching: false,
            is_dragging: false,
        })
    }

    /// Release the surface. Pending timers are dropped without firing.
    pub fn unbind(self) -> Arc<dyn Surface> {
        info!(surface = %self.surface.label(), "gesture classifier unbound");
        self.surface
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn registry(&self) -> &CallbackRegistry<E> {
        &self.registry
    }

    pub fn state(&self) -> ClassifierState {
        ClassifierState {
            is_touching: self.is_touching,
            is_dragging: self.is_dragging,
            long_press_deadline: self.timers.long_press_deadline(),
            double_tap_deadline: self.timers.double_tap_window_deadline(),
        }
    }

    /// Earliest instant at which `advance` has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Dynamic registration. `None` is silently ignored.
    pub fn register(
        &mut self,
        kind: GestureKind,
        callback: Option<Callback<E>>,
        options: Option<HandlerOptions>,
    ) {
        self.registry.register(kind, callback, options);
    }

    fn register_fn<F>(&mut self, kind: GestureKind, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.registry.register(kind, Some(Box::new(f)), options);
    }

    pub fn on_touch<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::Touch, f, options);
    }

    pub fn on_long_touch<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::LongTouch, f, options);
    }

    pub fn on_double_tap<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::DoubleTap, f, options);
    }

    pub fn on_drag_start<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::DragStart, f, options);
    }

    pub fn on_drag<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::Drag, f, options);
    }

    pub fn on_drag_end<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::DragEnd, f, options);
    }

    pub fn on_tap<F>(&mut self, f: F, options: Option<HandlerOptions>)
    where
        F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
    {
        self.register_fn(GestureKind::Tap, f, options);
    }

    // =========================================================================
    // RAW EVENT ENTRY POINTS
    // =========================================================================

    /// Contact went down.
    pub fn contact_start(&mut self, now: u64, event: E) -> DispatchResult {
        let timers = self.advance(now);
        let result = self.begin_contact(now, event);
        timers.and(result)
    }

    /// Contact moved.
    ///
    /// Any movement disqualifies the contact from becoming a tap or a fresh
    /// long touch.
    pub fn contact_move(&mut self, now: u64, event: E) -> DispatchResult {
        let timers = self.advance(now);
        let result = self.move_contact(now, event);
        timers.and(result)
    }

    /// Contact lifted.
    ///
    /// A contact that moved without entering drag mode ends silently: it is
    /// neither a tap nor a drag end.
    pub fn contact_end(&mut self, now: u64, event: E) -> DispatchResult {
        let timers = self.advance(now);
        let result = self.end_contact(now, event);
        timers.and(result)
    }

    /// Fire every timer whose deadline is `<= now`.
    ///
    /// Each timer runs on its own: a failing handler skips the rest of that
    /// timer's action but not later timers. The first failure is returned.
    pub fn advance(&mut self, now: u64) -> DispatchResult {
        let mut first_err = Ok(());
        while let Some(expired) = self.timers.pop_expired(now) {
            let result = self.fire(expired);
            if first_err.is_ok() {
                first_err = result;
            }
        }
        first_err
    }

    // A raw event's own dispatch aborts at the first failing handler. Timers
    // that came due before the event have already run by the time these are
    // called, whatever their outcome.

    fn begin_contact(&mut self, now: u64, event: E) -> DispatchResult {
        debug!(now, "contact start");

        self.emit(GestureKind::Touch, &event)?;
        self.is_touching = true;

        if self.timers.double_tap_window_pending() {
            self.emit(GestureKind::DoubleTap, &event)?;
            self.timers.consume_double_tap_window();
        }

        self.timers
            .arm_long_press(now, self.config.long_touch_ms, event);
        Ok(())
    }

    fn move_contact(&mut self, now: u64, event: E) -> DispatchResult {
        if self.is_dragging {
            self.emit(GestureKind::Drag, &event)?;
        }

        self.is_touching = false;
        if self.timers.cancel_long_press() {
            debug!(now, "long touch cancelled by movement");
        }
        Ok(())
    }

    fn end_contact(&mut self, now: u64, event: E) -> DispatchResult {
        debug!(now, "contact end");

        if self.is_dragging {
            self.emit(GestureKind::DragEnd, &event)?;
        } else if self.is_touching {
            self.emit(GestureKind::Tap, &event)?;
            self.timers
                .arm_double_tap_window(now, self.config.double_tap_ms);
        }

        self.is_touching = false;
        self.is_dragging = false;
        self.timers.cancel_long_press();
        Ok(())
    }

    fn fire(&mut self, expired: Expired<E>) -> DispatchResult {
        match expired {
            Expired::LongPress { fire_at, payload } => {
                debug!(fire_at, "long touch, entering drag mode");
                self.emit(GestureKind::LongTouch, &payload)?;
                self.emit(GestureKind::DragStart, &payload)?;
                self.is_dragging = true;
            }
            Expired::DoubleTapWindow { fire_at } => {
                debug!(fire_at, "double-tap window expired");
            }
        }
        Ok(())
    }

    fn emit(&mut self, kind: GestureKind, event: &E) -> DispatchResult {
        debug!(%kind, "gesture");
        self.registry.dispatch(
            kind,
            event,
            &[],
            self.surface.as_ref(),
            self.config.haptic_pulse_ms,
        )
    }
}

impl Classifier<ContactEvent> {
    /// Route a tagged raw event to its entry point, using the event's own
    /// timestamp as the current time.
    pub fn handle(&mut self, raw: RawContact) -> DispatchResult {
        let now = raw.event.timestamp_ms;
        match raw.phase {
            ContactPhase::Start => self.contact_start(now, raw.event),
            ContactPhase::Move => self.contact_move(now, raw.event),
            ContactPhase::End => self.contact_end(now, raw.event),
        }
    }
}

impl<E> fmt::Debug for Classifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("surface", &self.surface.label())
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("state", &self.state())
            .finish()
    }
}
