//! Common error types for touchsense-platform.

use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("classifier runtime is no longer running")]
    Detached,
    #[error("classifier runtime thread panicked")]
    RuntimePanicked,
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
