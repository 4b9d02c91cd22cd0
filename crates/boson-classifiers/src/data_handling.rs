//! Dataset value type and deterministic partitioning helpers.
//!
//! A `Dataset` bundles the event ids, the raw feature matrix and the
//! binary label vector, keeping the row alignment invariant in one place.
//! Shuffling always goes through an explicitly seeded generator so that
//! identical seed + identical row count yields an identical permutation.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub ids: Array1<i64>,
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl Dataset {
    pub fn new(ids: Array1<i64>, x: Array2<f64>, y: Array1<f64>) -> Result<Self, PipelineError> {
        if ids.len() != x.nrows() {
            return Err(PipelineError::ShapeMismatch {
                what: "ids vs feature rows",
                left: ids.len(),
                right: x.nrows(),
            });
        }
        if y.len() != x.nrows() {
            return Err(PipelineError::ShapeMismatch {
                what: "labels vs feature rows",
                left: y.len(),
                right: x.nrows(),
            });
        }
        Ok(Dataset { ids, x, y })
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// New dataset holding only the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            ids: self.ids.select(Axis(0), indices),
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }

    /// Rows whose value in `column` equals `code`.
    ///
    /// Group codes are small integers stored exactly in f64, so equality
    /// comparison is well defined here.
    pub fn filter_by_group(&self, column: usize, code: f64) -> Dataset {
        let indices: Vec<usize> = (0..self.nrows())
            .filter(|&r| self.x[[r, column]] == code)
            .collect();
        self.select(&indices)
    }

    pub fn log_summary(&self, name: &str) {
        let signal = self.y.iter().filter(|&&v| v > 0.5).count();
        log::info!(
            "{}: {} events ({} signal, {} background), {} features",
            name,
            self.nrows(),
            signal,
            self.nrows() - signal,
            self.ncols()
        );
    }
}

/// Seeded random permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    indices
}

/// Shuffle and split into train/validation parts.
///
/// The first `ceil(ratio * n)` permuted rows go to the training side,
/// the remainder to validation.
#[allow(clippy::type_complexity)]
pub fn split_train_test(
    x: &Array2<f64>,
    y: &Array1<f64>,
    ratio: f64,
    seed: u64,
) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>), PipelineError> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            what: "features vs labels",
            left: x.nrows(),
            right: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(PipelineError::EmptyInput("split_train_test"));
    }

    let n = x.nrows();
    let split = ((ratio * n as f64).ceil() as usize).min(n);
    let indices = permutation(n, seed);
    let (train_idx, val_idx) = indices.split_at(split);

    Ok((
        x.select(Axis(0), train_idx),
        x.select(Axis(0), val_idx),
        y.select(Axis(0), train_idx),
        y.select(Axis(0), val_idx),
    ))
}
