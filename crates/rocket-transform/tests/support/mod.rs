//! Test-only collaborators for the end-to-end scenario: a synthetic labeled
//! panel, a column scaler, a ridge classifier with leave-one-out alpha
//! selection, and an accuracy metric.

#![allow(dead_code)]

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Labeled panel split
pub struct LabeledPanel {
    pub series: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

/// Two-class panel: slow oscillation versus fast oscillation, random phase,
/// amplitude and offset, Gaussian noise.
pub fn two_class_panel(num_series: usize, length: usize, seed: u64) -> LabeledPanel {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.1).expect("valid noise distribution");

    let mut series = Vec::with_capacity(num_series);
    let mut labels = Vec::with_capacity(num_series);
    for i in 0..num_series {
        let label = i % 2;
        let period = if label == 0 {
            rng.gen_range(36.0..44.0)
        } else {
            rng.gen_range(8.0..11.0)
        };
        let phase = rng.gen_range(0.0..std::f64::consts::TAU);
        let amplitude = rng.gen_range(0.5..2.0);
        let offset = rng.gen_range(-3.0..3.0);

        let values = (0..length)
            .map(|t| {
                let angle = std::f64::consts::TAU * t as f64 / period + phase;
                offset + amplitude * angle.sin() + noise.sample(&mut rng)
            })
            .collect();
        series.push(values);
        labels.push(label);
    }

    LabeledPanel { series, labels }
}

/// Divides every column by its standard deviation, no centring
pub struct ColumnScaler {
    scale: Array1<f64>,
}

impl ColumnScaler {
    pub fn fit(x: &Array2<f64>) -> Self {
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 0.0 { s } else { 1.0 });
        Self { scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        x / &self.scale
    }
}

/// Ridge regression on ±1 class indicators, alpha chosen by leave-one-out error
pub struct RidgeClassifier {
    weights: Array2<f64>,
    intercept: Array1<f64>,
    pub alpha: f64,
}

impl RidgeClassifier {
    pub fn fit(x: &Array2<f64>, labels: &[usize], alphas: &[f64]) -> Self {
        let num_classes = labels.iter().max().map_or(1, |m| m + 1);
        let n = x.nrows();

        let mut y = Array2::from_elem((n, num_classes), -1.0);
        for (i, &label) in labels.iter().enumerate() {
            y[[i, label]] = 1.0;
        }

        let x_mean = x.mean_axis(Axis(0)).expect("non-empty training set");
        let y_mean = y.mean_axis(Axis(0)).expect("non-empty training set");
        let xc = x - &x_mean;
        let yc = &y - &y_mean;
        let gram = xc.dot(&xc.t());

        let mut best: Option<(f64, f64, Array2<f64>)> = None;
        for &alpha in alphas {
            let mut system = gram.clone();
            for i in 0..n {
                system[[i, i]] += alpha;
            }
            let inverse = invert_spd(&system);
            let dual = inverse.dot(&yc);

            let mut loo_error = 0.0;
            for i in 0..n {
                for c in 0..num_classes {
                    let residual = dual[[i, c]] / inverse[[i, i]];
                    loo_error += residual * residual;
                }
            }

            if best.as_ref().map_or(true, |(err, _, _)| loo_error < *err) {
                best = Some((loo_error, alpha, dual));
            }
        }

        let (_, alpha, dual) = best.expect("at least one alpha");
        let weights = xc.t().dot(&dual);
        let intercept = &y_mean - &x_mean.dot(&weights);

        Self {
            weights,
            intercept,
            alpha,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        let scores = x.dot(&self.weights) + &self.intercept;
        scores
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (c, &s)| {
                        if s > best.1 {
                            (c, s)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }
}

/// Inverse of a symmetric positive definite matrix via Cholesky
fn invert_spd(a: &Array2<f64>) -> Array2<f64> {
    let n = a.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| a[[i, j]]);
    let inverse = matrix
        .clone()
        .cholesky()
        .map(|factor| factor.inverse())
        .or_else(|| matrix.try_inverse())
        .expect("regularised gram matrix is invertible");
    Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)])
}

/// `logspace(start, stop, num)` in base 10
pub fn logspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![10f64.powf(start)];
    }
    let step = (stop - start) / (num - 1) as f64;
    (0..num)
        .map(|i| 10f64.powf(start + step * i as f64))
        .collect()
}

/// Fraction of matching labels
pub fn accuracy(predicted: &[usize], expected: &[usize]) -> f64 {
    assert_eq!(predicted.len(), expected.len());
    if expected.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / expected.len() as f64
}
