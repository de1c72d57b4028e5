//! Dilated Convolution and Response Pooling

use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};

/// Running max and positive count over a convolution response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseSummary {
    /// Largest response seen
    pub max: f64,
    /// Responses strictly greater than zero
    pub positives: usize,
    /// Responses seen
    pub count: usize,
}

impl Default for ResponseSummary {
    fn default() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            positives: 0,
            count: 0,
        }
    }
}

impl ResponseSummary {
    /// Fold one response value in
    #[inline]
    pub fn push(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value > 0.0 {
            self.positives += 1;
        }
        self.count += 1;
    }

    /// Combine two partial summaries; associative and commutative
    pub fn merge(self, other: Self) -> Self {
        Self {
            max: self.max.max(other.max),
            positives: self.positives + other.positives,
            count: self.count + other.count,
        }
    }

    /// Proportion of positive values, zero for an empty response
    pub fn ppv(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.positives as f64 / self.count as f64
        }
    }

    /// `(max, ppv)` feature pair
    pub fn finish(&self) -> (f64, f64) {
        (self.max, self.ppv())
    }
}

/// Response of `kernel` at output position `start` (may be negative under padding)
#[inline]
fn response_at(kernel: &Kernel, series: &[f64], start: isize) -> f64 {
    let len = series.len() as isize;
    let dilation = kernel.dilation() as isize;
    let mut sum = kernel.bias();
    let mut index = start;

    for &weight in kernel.weights() {
        if index >= 0 && index < len {
            sum += weight * series[index as usize];
        }
        index += dilation;
    }
    sum
}

/// Convolve `kernel` over `series` and pool the response
pub fn convolve(kernel: &Kernel, series: &[f64]) -> ResponseSummary {
    let padding = kernel.padding_len() as isize;
    let end = series.len() as isize + padding - kernel.span() as isize;

    let mut summary = ResponseSummary::default();
    for start in -padding..end {
        summary.push(response_at(kernel, series, start));
    }
    summary
}

/// Full response sequence, mainly for inspection and tests
pub fn response(kernel: &Kernel, series: &[f64]) -> Vec<f64> {
    let padding = kernel.padding_len() as isize;
    let end = series.len() as isize + padding - kernel.span() as isize;
    (-padding..end)
        .map(|start| response_at(kernel, series, start))
        .collect()
}
