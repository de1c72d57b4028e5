//! Validation Error Types

use thiserror::Error;

/// Errors raised while checking a panel of series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Batch contains no series at all
    #[error("Batch contains no series")]
    EmptyBatch,

    /// A series has no samples
    #[error("Series {index} has no samples")]
    EmptySeries { index: usize },

    /// Series length differs from the expected length
    #[error("Series {index} has length {actual}, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Sample is NaN or infinite
    #[error("Series {index} has non-finite value {value} at position {position}")]
    NonFinite {
        index: usize,
        position: usize,
        value: f64,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
