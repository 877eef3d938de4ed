//! Gesture kinds and per-handler options.

use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const KIND_COUNT: usize = 7;

/// Semantic gestures emitted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Contact went down. Fires on every contact start.
    Touch,
    /// Contact held still past the long-touch threshold.
    LongTouch,
    /// Second contact start inside the double-tap window.
    DoubleTap,
    /// Drag mode engaged (fires right after `LongTouch`).
    DragStart,
    /// Movement while in drag mode.
    Drag,
    /// Release while in drag mode.
    DragEnd,
    /// Release without movement, before the long-touch threshold.
    Tap,
}

impl GestureKind {
    /// Every kind, in declaration order.
    pub const ALL: [GestureKind; KIND_COUNT] = [
        GestureKind::Touch,
        GestureKind::LongTouch,
        GestureKind::DoubleTap,
        GestureKind::DragStart,
        GestureKind::Drag,
        GestureKind::DragEnd,
        GestureKind::Tap,
    ];

    /// Registry slot for this kind.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::Touch => "touch",
            GestureKind::LongTouch => "long_touch",
            GestureKind::DoubleTap => "double_tap",
            GestureKind::DragStart => "drag_start",
            GestureKind::Drag => "drag",
            GestureKind::DragEnd => "drag_end",
            GestureKind::Tap => "tap",
        }
    }

    /// Parse the snake_case name used in scripts and config files.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options attached to a registered handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    /// Pulse the surface's haptics after the handler returns.
    pub vibrate: bool,
}

impl HandlerOptions {
    pub fn vibrate() -> Self {
        Self { vibrate: true }
    }
}
