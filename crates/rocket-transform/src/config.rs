//! Transform configuration

use crate::RocketError;
use serde::{Deserialize, Serialize};

/// Default number of kernels
pub const DEFAULT_NUM_KERNELS: usize = 10_000;

/// Transform configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    /// Number of random kernels; output has twice as many columns
    pub num_kernels: usize,

    /// Seed for kernel generation, `None` draws one from the OS
    pub random_state: Option<u64>,

    /// Z-normalize every series before convolution
    pub normalise: bool,

    /// Size of a dedicated worker pool, `None` uses the global rayon pool
    pub num_threads: Option<usize>,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            num_kernels: DEFAULT_NUM_KERNELS,
            random_state: None,
            normalise: true,
            num_threads: None,
        }
    }
}

impl RocketConfig {
    /// Create config with a fixed kernel count and seed
    pub fn seeded(num_kernels: usize, random_state: u64) -> Self {
        Self {
            num_kernels,
            random_state: Some(random_state),
            ..Default::default()
        }
    }

    /// Create single-threaded config
    pub fn sequential() -> Self {
        Self {
            num_threads: Some(1),
            ..Default::default()
        }
    }

    /// Check values before any kernel is generated
    pub fn validate(&self) -> Result<(), RocketError> {
        if self.num_kernels == 0 {
            return Err(RocketError::InvalidConfig(
                "num_kernels must be at least 1".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(RocketError::InvalidConfig(
                "num_threads must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
