//! Panel Validation and Normalization
//!
//! Shape checks and per-series normalization for batches of fixed-length time series.

mod error;
mod normalizer;
mod validator;

pub use error::ValidationError;
pub use normalizer::{NormalizationMethod, Normalizer, STD_EPSILON};
pub use validator::{PanelShape, ValidationConfig, Validator};
