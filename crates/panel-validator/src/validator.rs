//! Panel Validator for Shape Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject NaN and infinite samples
    pub require_finite: bool,
    /// Accept a batch with zero series
    pub allow_empty_batch: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_finite: true,
            allow_empty_batch: false,
        }
    }
}

impl ValidationConfig {
    /// Config used at transform time, where an empty batch yields an empty matrix
    pub fn lenient() -> Self {
        Self {
            allow_empty_batch: true,
            ..Default::default()
        }
    }
}

/// Shape of a validated panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelShape {
    /// Number of series in the batch
    pub num_series: usize,
    /// Common length of every series
    pub series_length: usize,
}

/// Validator for batches of equal-length series
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate one series against an expected length
    pub fn validate_series(
        &self,
        index: usize,
        series: &[f64],
        expected_len: usize,
    ) -> Result<(), ValidationError> {
        if series.is_empty() {
            return Err(ValidationError::EmptySeries { index });
        }

        if series.len() != expected_len {
            return Err(ValidationError::LengthMismatch {
                index,
                expected: expected_len,
                actual: series.len(),
            });
        }

        if self.config.require_finite {
            if let Some((position, &value)) =
                series.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(ValidationError::NonFinite {
                    index,
                    position,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Validate a batch whose common length is taken from the first series
    pub fn validate_panel<S: AsRef<[f64]>>(
        &self,
        batch: &[S],
    ) -> Result<PanelShape, ValidationError> {
        let Some(first) = batch.first() else {
            if self.config.allow_empty_batch {
                return Ok(PanelShape {
                    num_series: 0,
                    series_length: 0,
                });
            }
            return Err(ValidationError::EmptyBatch);
        };

        let series_length = first.as_ref().len();
        self.validate_batch(batch, series_length)?;

        Ok(PanelShape {
            num_series: batch.len(),
            series_length,
        })
    }

    /// Validate a batch against a known length
    pub fn validate_batch<S: AsRef<[f64]>>(
        &self,
        batch: &[S],
        expected_len: usize,
    ) -> Result<(), ValidationError> {
        if batch.is_empty() && !self.config.allow_empty_batch {
            return Err(ValidationError::EmptyBatch);
        }

        for (index, series) in batch.iter().enumerate() {
            self.validate_series(index, series.as_ref(), expected_len)?;
        }

        debug!(
            "Validated batch of {} series (length {})",
            batch.len(),
            expected_len
        );
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
