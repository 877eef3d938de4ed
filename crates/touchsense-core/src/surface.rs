//! Contact surface collaborator.
//!
//! The classifier never talks to a windowing system directly. The host wraps
//! its element in a [`Surface`] and feeds raw contact events into the
//! classifier's entry points.

use crate::BindError;

/// Something a classifier may be asked to bind to.
pub trait Surface: Send + Sync {
    /// Human readable name, used in logs and bind errors.
    fn label(&self) -> String;

    /// Whether this is a renderable surface that can receive contacts.
    /// Binding to a target that returns false fails.
    fn is_renderable(&self) -> bool;

    /// Best-effort haptic pulse. `pattern` lists pulse durations in
    /// milliseconds. Returns false when the host has no haptics.
    fn vibrate(&self, _pattern: &[u64]) -> bool {
        false
    }
}

/// Reject anything that is not a renderable surface.
pub(crate) fn validate(surface: &dyn Surface) -> Result<(), BindError> {
    if surface.is_renderable() {
        Ok(())
    } else {
        Err(BindError::NotASurface(surface.label()))
    }
}
