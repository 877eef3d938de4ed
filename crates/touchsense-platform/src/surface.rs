//! In-process surfaces.
//!
//! `VirtualSurface` stands in for a rendered element on hosts without a
//! native widget tree (headless replays, tests, the global pointer hook).
//! `DetachedNode` models a target that was never rendered.

use std::sync::Mutex;
use touchsense_core::Surface;
use tracing::debug;

/// A renderable surface that records haptic pulses instead of playing them.
#[derive(Debug)]
pub struct VirtualSurface {
    label: String,
    haptics: bool,
    pulses: Mutex<Vec<Vec<u64>>>,
}

impl VirtualSurface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            haptics: true,
            pulses: Mutex::new(Vec::new()),
        }
    }

    /// A surface whose host has no vibration support. Pulses are rejected.
    pub fn without_haptics(label: impl Into<String>) -> Self {
        Self {
            haptics: false,
            ..Self::new(label)
        }
    }

    /// Patterns accepted so far, oldest first.
    pub fn pulses(&self) -> Vec<Vec<u64>> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Surface for VirtualSurface {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_renderable(&self) -> bool {
        true
    }

    fn vibrate(&self, pattern: &[u64]) -> bool {
        if !self.haptics {
            return false;
        }
        debug!(surface = %self.label, ?pattern, "vibrate");
        match self.pulses.lock() {
            Ok(mut pulses) => {
                pulses.push(pattern.to_vec());
                true
            }
            Err(_) => false,
        }
    }
}

/// A target that is not part of any rendered tree.
#[derive(Debug, Clone)]
pub struct DetachedNode {
    label: String,
}

impl DetachedNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Surface for DetachedNode {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_renderable(&self) -> bool {
        false
    }
}
