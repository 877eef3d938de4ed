//! touchsense-platform: host-side plumbing for touchsense classifiers.
//!
//! This crate provides:
//! - In-process surfaces (`VirtualSurface`, `DetachedNode`)
//! - A runtime thread that owns a classifier and fires its timers in real time
//! - A global pointer hook via `rdev` that emulates touch with the mouse
//!   (behind the `rdev` feature)

mod error;
mod runtime;
mod surface;

#[cfg(feature = "rdev")]
mod pointer_hook;

pub use error::{PlatformError, PlatformResult};

pub use runtime::{ContactSink, RuntimeCommand, RuntimeEvent, RuntimeHandle, SurfaceRuntime};

pub use surface::{DetachedNode, VirtualSurface};

#[cfg(feature = "rdev")]
pub use pointer_hook::{start_pointer_hook, PointerHookHandle};
