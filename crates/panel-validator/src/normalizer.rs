//! Per-series Normalization

use serde::{Deserialize, Serialize};

/// Added to the standard deviation so flat series do not divide by zero
pub const STD_EPSILON: f64 = 1e-8;

/// Normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizationMethod {
    /// Z-score normalization using the series' own mean and std
    #[default]
    ZScore,
    /// No normalization
    None,
}

/// Stateless per-series normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Method to use
    method: NormalizationMethod,
}

impl Normalizer {
    /// Create a new normalizer
    pub fn new(method: NormalizationMethod) -> Self {
        Self { method }
    }

    /// Get the configured method
    pub fn method(&self) -> NormalizationMethod {
        self.method
    }

    /// Normalize a whole series into a fresh buffer
    pub fn normalize(&self, series: &[f64]) -> Vec<f64> {
        match self.method {
            NormalizationMethod::ZScore => {
                if series.is_empty() {
                    return Vec::new();
                }
                let (mean, std_dev) = Self::moments(series);
                let scale = std_dev + STD_EPSILON;
                series.iter().map(|&v| (v - mean) / scale).collect()
            }
            NormalizationMethod::None => series.to_vec(),
        }
    }

    /// Mean and population standard deviation
    pub fn moments(series: &[f64]) -> (f64, f64) {
        if series.is_empty() {
            return (0.0, 0.0);
        }

        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;
        let variance = series.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
        (mean, variance.sqrt())
    }
}
