//! Error types for touchsense-core.

use crate::GestureKind;
use thiserror::Error;

/// Binding a classifier failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("unable to bind gesture classifier to a non-surface target: {0}")]
    NotASurface(String),
    #[error("{0}")]
    InvalidConfig(String),
}

/// Failure reported by a registered gesture handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A handler failed mid-dispatch. Later handlers for the same kind and the
/// remainder of the raw event were skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} handler #{index} failed: {source}")]
pub struct DispatchError {
    pub kind: GestureKind,
    /// Position of the failing handler in its registry.
    pub index: usize,
    #[source]
    pub source: HandlerError,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result of a single handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// Result of a classifier entry point.
pub type DispatchResult = Result<(), DispatchError>;
