//! Callback registry and dispatcher.

use crate::error::{DispatchError, DispatchResult, HandlerResult};
use crate::gesture::KIND_COUNT;
use crate::{GestureKind, HandlerOptions, Surface};
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

/// A gesture handler. Receives the raw event payload and extra gesture
/// parameters (currently always empty).
pub type Callback<E> = Box<dyn FnMut(&E, &[Value]) -> HandlerResult + Send>;

/// Box a closure into a [`Callback`].
pub fn callback<E, F>(f: F) -> Callback<E>
where
    F: FnMut(&E, &[Value]) -> HandlerResult + Send + 'static,
{
    Box::new(f)
}

/// One registered handler.
pub struct HandlerEntry<E> {
    callback: Callback<E>,
    options: HandlerOptions,
}

impl<E> HandlerEntry<E> {
    pub fn options(&self) -> HandlerOptions {
        self.options
    }
}

/// Append-only, per-kind ordered handler lists.
pub struct CallbackRegistry<E> {
    slots: [Vec<HandlerEntry<E>>; KIND_COUNT],
}

impl<E> CallbackRegistry<E> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Append a handler for `kind`.
    ///
    /// An absent callback is ignored without any error: hosts that wire
    /// handlers from dynamic sources rely on this.
    pub fn register(
        &mut self,
        kind: GestureKind,
        callback: Option<Callback<E>>,
        options: Option<HandlerOptions>,
    ) {
        let Some(callback) = callback else {
            debug!(%kind, "ignoring registration without a callable handler");
            return;
        };

        let options = options.unwrap_or_default();
        self.slots[kind.index()].push(HandlerEntry { callback, options });
        debug!(%kind, ?options, count = self.len(kind), "handler registered");
    }

    /// Number of handlers registered for `kind`.
    pub fn len(&self, kind: GestureKind) -> usize {
        self.slots[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn entries(&self, kind: GestureKind) -> &[HandlerEntry<E>] {
        &self.slots[kind.index()]
    }

    /// Invoke every handler for `kind` in registration order.
    ///
    /// A failing handler stops the fan-out: neither its haptic pulse nor any
    /// later handler runs.
    pub(crate) fn dispatch(
        &mut self,
        kind: GestureKind,
        event: &E,
        params: &[Value],
        surface: &dyn Surface,
        pulse_ms: u64,
    ) -> DispatchResult {
        let slot = &mut self.slots[kind.index()];
        trace!(%kind, handlers = slot.len(), "dispatching");

        for (index, entry) in slot.iter_mut().enumerate() {
            (entry.callback)(event, params).map_err(|source| DispatchError {
                kind,
                index,
                source,
            })?;

            if entry.options.vibrate && !surface.vibrate(&[pulse_ms]) {
                trace!(%kind, "surface has no haptics, pulse skipped");
            }
        }

        Ok(())
    }
}

impl<E> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for CallbackRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in GestureKind::ALL {
            map.entry(&kind, &self.len(kind));
        }
        map.finish()
    }
}
