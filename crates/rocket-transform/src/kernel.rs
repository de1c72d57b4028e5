//! Random Kernel Generation
//!
//! Sampling contract for every kernel:
//!
//! - length uniform over [`KERNEL_LENGTHS`], restricted to lengths that fit the series
//! - weights i.i.d. standard normal, then mean-centred so they sum to zero
//! - bias uniform over [`BIAS_RANGE`]
//! - dilation `floor(2^u)` with `u ~ U(0, log2((L - 1) / (length - 1)))`
//! - zero padding of `((length - 1) * dilation) / 2` on each side with probability 1/2

use crate::RocketError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Candidate kernel lengths
pub const KERNEL_LENGTHS: [usize; 3] = [7, 9, 11];

/// Smallest series length any kernel fits into
pub const MIN_SERIES_LENGTH: usize = KERNEL_LENGTHS[0];

/// Half-open range the bias is drawn from
pub const BIAS_RANGE: (f64, f64) = (-1.0, 1.0);

/// Tolerance on the weight sum after centring, relative to the largest weight
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Largest tap span a kernel may have; keeps tap offsets inside `isize`
const MAX_SPAN: usize = (isize::MAX / 4) as usize;

/// Padding mode of a kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    /// Only positions where every tap lands inside the series
    None,
    /// Series extended symmetrically with zeros
    Zero,
}

/// A single dilated convolution kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kernel {
    weights: Vec<f64>,
    bias: f64,
    dilation: usize,
    padding: Padding,
}

impl Kernel {
    /// Build a kernel from explicit parameters, centring the weights
    pub fn new(
        weights: Vec<f64>,
        bias: f64,
        dilation: usize,
        padding: Padding,
    ) -> Result<Self, RocketError> {
        if weights.is_empty() {
            return Err(RocketError::InvalidConfig(
                "kernel needs at least one weight".to_string(),
            ));
        }
        if dilation == 0 {
            return Err(RocketError::InvalidConfig(
                "kernel dilation must be at least 1".to_string(),
            ));
        }
        if checked_span(weights.len(), dilation).is_none() {
            return Err(RocketError::InvalidConfig(format!(
                "kernel dilation {} is too large for {} taps",
                dilation,
                weights.len()
            )));
        }

        Ok(Self {
            weights: center(weights),
            bias,
            dilation,
            padding,
        })
    }

    /// Draw a random kernel that fits a series of `series_length` samples
    fn sample<R: Rng + ?Sized>(rng: &mut R, series_length: usize, lengths: &[usize]) -> Self {
        let length = lengths[rng.gen_range(0..lengths.len())];

        let weights: Vec<f64> = (0..length)
            .map(|_| -> f64 { StandardNormal.sample(rng) })
            .collect();
        let bias = Uniform::new(BIAS_RANGE.0, BIAS_RANGE.1).sample(rng);

        let max_dilation = (series_length - 1) / (length - 1);
        let upper = ((series_length - 1) as f64 / (length - 1) as f64).log2();
        let exponent = rng.gen::<f64>() * upper.max(0.0);
        let dilation = (2f64.powf(exponent) as usize).clamp(1, max_dilation.max(1));

        let padding = if rng.gen_bool(0.5) {
            Padding::Zero
        } else {
            Padding::None
        };

        Self {
            weights: center(weights),
            bias,
            dilation,
            padding,
        }
    }

    /// Number of taps
    pub fn length(&self) -> usize {
        self.weights.len()
    }

    /// Mean-centred weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Bias added to every response
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Spacing between consecutive taps
    pub fn dilation(&self) -> usize {
        self.dilation
    }

    /// Padding mode
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Zeros added on each side of the series
    pub fn padding_len(&self) -> usize {
        match self.padding {
            Padding::Zero => self.span() / 2,
            Padding::None => 0,
        }
    }

    /// Number of input positions one application reads from
    pub fn receptive_field(&self) -> usize {
        self.span().saturating_add(1)
    }

    /// Number of response values for a series of `series_length` samples
    pub fn output_length(&self, series_length: usize) -> usize {
        series_length
            .saturating_add(2 * self.padding_len())
            .saturating_sub(self.span())
    }

    /// Distance between first and last tap
    pub(crate) fn span(&self) -> usize {
        self.length().saturating_sub(1).saturating_mul(self.dilation)
    }

    /// Runs before any method that derives the span, so decoded values cannot overflow
    fn check(&self, series_length: usize) -> Result<(), String> {
        let length = self.length();
        if !KERNEL_LENGTHS.contains(&length) {
            return Err(format!("unsupported kernel length {}", length));
        }
        if self.dilation == 0 {
            return Err("dilation must be at least 1".to_string());
        }
        let receptive_field = checked_span(length, self.dilation)
            .and_then(|span| span.checked_add(1))
            .ok_or_else(|| format!("dilation {} overflows the receptive field", self.dilation))?;
        if receptive_field > series_length {
            return Err(format!(
                "receptive field {} exceeds series length {}",
                receptive_field, series_length
            ));
        }
        if self.dilation > (series_length - 1) / (length - 1) {
            return Err(format!(
                "dilation {} exceeds the maximum {} for series length {}",
                self.dilation,
                (series_length - 1) / (length - 1),
                series_length
            ));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err("non-finite kernel parameter".to_string());
        }
        let scale = self
            .weights
            .iter()
            .fold(1.0f64, |acc, w| acc.max(w.abs()));
        if self.weights.iter().sum::<f64>().abs() > WEIGHT_SUM_TOLERANCE * length as f64 * scale {
            return Err("kernel weights are not centred".to_string());
        }
        Ok(())
    }
}

fn checked_span(length: usize, dilation: usize) -> Option<usize> {
    length
        .checked_sub(1)?
        .checked_mul(dilation)
        .filter(|&span| span <= MAX_SPAN)
}

fn center(mut weights: Vec<f64>) -> Vec<f64> {
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    for w in weights.iter_mut() {
        *w -= mean;
    }
    weights
}

/// Ordered, immutable set of kernels generated for one series length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSet {
    series_length: usize,
    kernels: Vec<Kernel>,
}

impl KernelSet {
    /// Generate `num_kernels` random kernels for series of `series_length` samples
    pub fn generate<R: Rng + ?Sized>(
        series_length: usize,
        num_kernels: usize,
        rng: &mut R,
    ) -> Result<Self, RocketError> {
        if num_kernels == 0 {
            return Err(RocketError::InvalidConfig(
                "num_kernels must be at least 1".to_string(),
            ));
        }
        if series_length < MIN_SERIES_LENGTH {
            return Err(RocketError::SeriesTooShort {
                length: series_length,
                min: MIN_SERIES_LENGTH,
            });
        }

        let lengths: Vec<usize> = KERNEL_LENGTHS
            .iter()
            .copied()
            .filter(|&len| len <= series_length)
            .collect();

        let kernels: Vec<Kernel> = (0..num_kernels)
            .map(|_| Kernel::sample(rng, series_length, &lengths))
            .collect();

        let padded = kernels
            .iter()
            .filter(|k| k.padding == Padding::Zero)
            .count();
        let max_dilation = kernels.iter().map(|k| k.dilation).max().unwrap_or(1);
        info!(
            "Generated {} kernels for series length {}",
            num_kernels, series_length
        );
        debug!(
            "Kernel set: {} zero-padded, max dilation {}",
            padded, max_dilation
        );

        Ok(Self {
            series_length,
            kernels,
        })
    }

    /// Generate from a seed with the portable ChaCha8 generator
    pub fn seeded(series_length: usize, num_kernels: usize, seed: u64) -> Result<Self, RocketError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::generate(series_length, num_kernels, &mut rng)
    }

    /// Assemble a set from explicit kernels
    pub fn from_kernels(series_length: usize, kernels: Vec<Kernel>) -> Result<Self, RocketError> {
        let set = Self {
            series_length,
            kernels,
        };
        set.validate().map_err(RocketError::InvalidConfig)?;
        Ok(set)
    }

    /// Series length the kernels were generated for
    pub fn series_length(&self) -> usize {
        self.series_length
    }

    /// Number of kernels
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the set has no kernels
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Kernels in generation order
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Iterate kernels in generation order
    pub fn iter(&self) -> std::slice::Iter<'_, Kernel> {
        self.kernels.iter()
    }

    /// Number of output features per series
    pub fn num_features(&self) -> usize {
        2 * self.kernels.len()
    }

    /// Encode with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, RocketError> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decode with postcard and re-check every kernel
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RocketError> {
        let set: Self = postcard::from_bytes(bytes)?;
        set.validate().map_err(RocketError::Decode)?;
        Ok(set)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.kernels.is_empty() {
            return Err("kernel set is empty".to_string());
        }
        if self.series_length < MIN_SERIES_LENGTH {
            return Err(format!(
                "series length {} is below the minimum {}",
                self.series_length, MIN_SERIES_LENGTH
            ));
        }
        for (i, kernel) in self.kernels.iter().enumerate() {
            kernel
                .check(self.series_length)
                .map_err(|e| format!("kernel {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a KernelSet {
    type Item = &'a Kernel;
    type IntoIter = std::slice::Iter<'a, Kernel>;

    fn into_iter(self) -> Self::IntoIter {
        self.kernels.iter()
    }
}
