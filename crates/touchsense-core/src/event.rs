//! Raw contact events.
//!
//! The classifier is generic over its payload; these are the concrete
//! payloads used by the platform adapters and the replay tool.

use serde::{Deserialize, Serialize};

/// Which of the three raw entry points an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPhase {
    Start,
    Move,
    End,
}

/// A contact sample delivered by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Milliseconds on the surface's clock.
    pub timestamp_ms: u64,
    pub x: f32,
    pub y: f32,
}

impl ContactEvent {
    pub fn new(timestamp_ms: u64, x: f32, y: f32) -> Self {
        Self { timestamp_ms, x, y }
    }
}

/// A raw event tagged with its entry point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawContact {
    pub phase: ContactPhase,
    pub event: ContactEvent,
}

impl RawContact {
    pub fn start(timestamp_ms: u64, x: f32, y: f32) -> Self {
        Self {
            phase: ContactPhase::Start,
            event: ContactEvent::new(timestamp_ms, x, y),
        }
    }

    pub fn moved(timestamp_ms: u64, x: f32, y: f32) -> Self {
        Self {
            phase: ContactPhase::Move,
            event: ContactEvent::new(timestamp_ms, x, y),
        }
    }

    pub fn end(timestamp_ms: u64, x: f32, y: f32) -> Self {
        Self {
            phase: ContactPhase::End,
            event: ContactEvent::new(timestamp_ms, x, y),
        }
    }
}
