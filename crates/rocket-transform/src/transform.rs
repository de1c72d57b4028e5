//! Rocket Transform
//!
//! Fits a [`KernelSet`] on the shape of a training batch and maps each series
//! to `[max_0, ppv_0, max_1, ppv_1, ...]`, one pair per kernel.

use std::sync::Arc;

use crate::config::RocketConfig;
use crate::convolution::convolve;
use crate::kernel::KernelSet;
use crate::RocketError;
use ndarray::Array2;
use panel_validator::{NormalizationMethod, Normalizer, ValidationConfig, Validator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Encoded form of a fitted transform
#[derive(Serialize)]
struct SavedTransformRef<'a> {
    normalise: bool,
    kernels: &'a KernelSet,
}

/// Decoded form of a fitted transform, same field order as [`SavedTransformRef`]
#[derive(Deserialize)]
struct SavedTransform {
    normalise: bool,
    kernels: KernelSet,
}

/// Random convolutional kernel transform
#[derive(Debug)]
pub struct RocketTransform {
    /// Configuration
    config: RocketConfig,
    /// Kernels, present once fitted
    kernels: Option<Arc<KernelSet>>,
    /// Dedicated worker pool when `num_threads` is set
    pool: Option<Arc<ThreadPool>>,
    /// Per-series normalizer
    normalizer: Normalizer,
}

impl RocketTransform {
    /// Create an unfitted transform
    pub fn new(config: RocketConfig) -> Result<Self, RocketError> {
        config.validate()?;

        let pool = match config.num_threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new().num_threads(threads).build()?,
            )),
            None => None,
        };

        let method = if config.normalise {
            NormalizationMethod::ZScore
        } else {
            NormalizationMethod::None
        };

        debug!(
            "Creating rocket transform: num_kernels={}, normalise={}, threads={:?}",
            config.num_kernels, config.normalise, config.num_threads
        );

        Ok(Self {
            config,
            kernels: None,
            pool,
            normalizer: Normalizer::new(method),
        })
    }

    /// Create a fitted transform from previously generated kernels
    pub fn from_kernels(config: RocketConfig, kernels: KernelSet) -> Result<Self, RocketError> {
        let mut transform = Self::new(RocketConfig {
            num_kernels: kernels.len(),
            ..config
        })?;
        transform.kernels = Some(Arc::new(kernels));
        Ok(transform)
    }

    /// Encode the kernels together with the normalisation they were fitted with
    pub fn to_bytes(&self) -> Result<Vec<u8>, RocketError> {
        let kernels = self.kernels.as_deref().ok_or(RocketError::NotFitted)?;
        Ok(postcard::to_allocvec(&SavedTransformRef {
            normalise: self.config.normalise,
            kernels,
        })?)
    }

    /// Restore a fitted transform; the saved `normalise` flag overrides `config`
    pub fn from_bytes(config: RocketConfig, bytes: &[u8]) -> Result<Self, RocketError> {
        let saved: SavedTransform = postcard::from_bytes(bytes)?;
        saved.kernels.validate().map_err(RocketError::Decode)?;

        if saved.normalise != config.normalise {
            warn!(
                "Using saved normalise={} instead of configured normalise={}",
                saved.normalise, config.normalise
            );
        }

        Self::from_kernels(
            RocketConfig {
                normalise: saved.normalise,
                ..config
            },
            saved.kernels,
        )
    }

    /// Generate kernels from the batch shape, seeded from `random_state`
    pub fn fit<S: AsRef<[f64]>>(&mut self, batch: &[S]) -> Result<&mut Self, RocketError> {
        let mut rng = match self.config.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.fit_with_rng(batch, &mut rng)
    }

    /// Generate kernels from the batch shape using an injected random source
    pub fn fit_with_rng<S, R>(&mut self, batch: &[S], rng: &mut R) -> Result<&mut Self, RocketError>
    where
        S: AsRef<[f64]>,
        R: Rng + ?Sized,
    {
        let shape = Validator::default().validate_panel(batch)?;

        let kernels = KernelSet::generate(shape.series_length, self.config.num_kernels, rng)?;
        info!(
            "Fitted rocket transform on {} series of length {}",
            shape.num_series, shape.series_length
        );

        self.kernels = Some(Arc::new(kernels));
        Ok(self)
    }

    /// Map every series to its feature vector
    pub fn transform<S>(&self, batch: &[S]) -> Result<Array2<f64>, RocketError>
    where
        S: AsRef<[f64]> + Sync,
    {
        let kernels = self.kernels.as_deref().ok_or(RocketError::NotFitted)?;

        Validator::new(ValidationConfig::lenient())
            .validate_batch(batch, kernels.series_length())?;

        let width = kernels.num_features();
        let mut data = vec![0.0; batch.len() * width];

        match &self.pool {
            Some(pool) => pool.install(|| self.fill_rows(kernels, batch, &mut data)),
            None => self.fill_rows(kernels, batch, &mut data),
        }

        debug!("Transformed {} series into {} features", batch.len(), width);

        Array2::from_shape_vec((batch.len(), width), data)
            .map_err(|e| RocketError::InvalidConfig(e.to_string()))
    }

    /// Fit on `batch` then transform it
    pub fn fit_transform<S>(&mut self, batch: &[S]) -> Result<Array2<f64>, RocketError>
    where
        S: AsRef<[f64]> + Sync,
    {
        self.fit(batch)?;
        self.transform(batch)
    }

    fn fill_rows<S>(&self, kernels: &KernelSet, batch: &[S], data: &mut [f64])
    where
        S: AsRef<[f64]> + Sync,
    {
        data.par_chunks_mut(kernels.num_features())
            .zip(batch.par_iter())
            .for_each(|(row, series)| self.transform_series(kernels, series.as_ref(), row));
    }

    fn transform_series(&self, kernels: &KernelSet, series: &[f64], row: &mut [f64]) {
        let series = self.normalizer.normalize(series);
        for (pair, kernel) in row.chunks_exact_mut(2).zip(kernels) {
            let (max, ppv) = convolve(kernel, &series).finish();
            pair[0] = max;
            pair[1] = ppv;
        }
    }

    /// Fitted kernels, if any
    pub fn kernels(&self) -> Option<&KernelSet> {
        self.kernels.as_deref()
    }

    /// Shared handle to the fitted kernels
    pub fn shared_kernels(&self) -> Option<Arc<KernelSet>> {
        self.kernels.clone()
    }

    /// Whether fit has been called
    pub fn is_fitted(&self) -> bool {
        self.kernels.is_some()
    }

    /// Output width, `2 * num_kernels`
    pub fn num_features(&self) -> usize {
        2 * self.config.num_kernels
    }

    /// Get the configuration
    pub fn config(&self) -> &RocketConfig {
        &self.config
    }
}
