//! Random Convolutional Kernel Transform
//!
//! Generates random dilated 1-D kernels from the shape of a training panel and
//! turns every series into two pooled statistics per kernel: the maximum
//! response and the proportion of positive values.

mod config;
mod convolution;
mod error;
mod kernel;
mod transform;

pub use config::{RocketConfig, DEFAULT_NUM_KERNELS};
pub use convolution::{convolve, response, ResponseSummary};
pub use error::{ErrorKind, RocketError};
pub use kernel::{
    Kernel, KernelSet, Padding, BIAS_RANGE, KERNEL_LENGTHS, MIN_SERIES_LENGTH,
    WEIGHT_SUM_TOLERANCE,
};
pub use transform::RocketTransform;
