//! touchsense-core: single-contact gesture classification.
//!
//! Design goal: keep this crate platform-agnostic and clock-agnostic. The
//! host feeds raw contact events (start/move/end) with its own timestamps;
//! windowing, threads and real timers live in `touchsense-platform`.
//!
//! ```text
//! contact_start ─┐
//! contact_move  ─┼──► Classifier ──► CallbackRegistry ──► handlers
//! contact_end   ─┘        │                   │
//!                         ▼                   ▼
//!                  TimingController      Surface::vibrate
//! ```

mod classifier;
mod config;
mod error;
mod event;
mod gesture;
mod registry;
mod replay;
mod surface;
mod timer;

#[cfg(test)]
mod testing;

pub use classifier::{Classifier, ClassifierState};
pub use config::{
    config_dir, default_config_path, load_yaml, parse_yaml, ClassifierConfig,
};
pub use error::{
    BindError, ConfigError, ConfigResult, DispatchError, DispatchResult, HandlerError,
    HandlerResult,
};
pub use event::{ContactEvent, ContactPhase, RawContact};
pub use gesture::{GestureKind, HandlerOptions};
pub use registry::{callback, Callback, CallbackRegistry, HandlerEntry};
pub use replay::{kinds, ContactScript, ContactStep, GestureRecord, Replayer};
pub use surface::Surface;
pub use timer::{Expired, TimerSlot, TimingController};

/// Default long-touch threshold (milliseconds).
pub const DEFAULT_LONG_TOUCH_MS: u64 = 800;

/// Default double-tap window (milliseconds).
pub const DEFAULT_DOUBLE_TAP_MS: u64 = 300;

/// Default haptic pulse length (milliseconds).
pub const DEFAULT_HAPTIC_PULSE_MS: u64 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_double_tap_window_shorter_than_long_touch() {
        assert!(DEFAULT_DOUBLE_TAP_MS < DEFAULT_LONG_TOUCH_MS);
        assert!(DEFAULT_HAPTIC_PULSE_MS > 0);
    }
}
