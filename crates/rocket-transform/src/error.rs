//! Transform Error Types

use panel_validator::ValidationError;
use thiserror::Error;

/// Coarse classification of a [`RocketError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration, series too short, or unreadable kernel data
    Configuration,
    /// Transform requested before fit
    NotFitted,
    /// Input batch does not have the expected shape or contents
    ShapeMismatch,
}

/// Errors raised by kernel generation and transformation
#[derive(Debug, Error)]
pub enum RocketError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No kernel fits inside a series of this length
    #[error("Series length {length} is shorter than the minimum receptive field {min}")]
    SeriesTooShort { length: usize, min: usize },

    /// Transform called before fit
    #[error("Transform has not been fitted")]
    NotFitted,

    /// Input batch rejected by the panel validator
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(#[from] ValidationError),

    /// Persisted kernel data could not be decoded or failed validation
    #[error("Kernel decode failed: {0}")]
    Decode(String),

    /// Dedicated worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl RocketError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            RocketError::InvalidConfig(_)
            | RocketError::SeriesTooShort { .. }
            | RocketError::Decode(_)
            | RocketError::ThreadPool(_) => ErrorKind::Configuration,
            RocketError::NotFitted => ErrorKind::NotFitted,
            RocketError::ShapeMismatch(_) => ErrorKind::ShapeMismatch,
        }
    }
}

impl From<postcard::Error> for RocketError {
    fn from(err: postcard::Error) -> Self {
        RocketError::Decode(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for RocketError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        RocketError::ThreadPool(err.to_string())
    }
}
