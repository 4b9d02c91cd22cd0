//! K-fold cross-validation over the full preprocess/expand/fit/predict
//! pipeline.
//!
//! Folds are contiguous blocks of `floor(n/k)` rows taken from a single
//! seeded permutation. Remainder rows never form their own validation
//! block; they join the training side of every fold.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::HyperParams;
use crate::data_handling::permutation;
use crate::error::PipelineError;
use crate::pipeline::run_pipeline;
use crate::stats::{accuracy_score, f1_score, mean_std};

/// Aggregate scores across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvScores {
    pub f1_mean: f64,
    pub f1_std: f64,
    pub acc_mean: f64,
    pub acc_std: f64,
}

impl CvScores {
    /// Sentinel below any attainable score, recorded for failed grid cells.
    pub fn sentinel() -> Self {
        CvScores {
            f1_mean: -1.0,
            f1_std: -1.0,
            acc_mean: -1.0,
            acc_std: -1.0,
        }
    }
}

/// Per-fold (train, validation) row indices from one seeded permutation.
pub fn k_fold_indices(
    n: usize,
    k: usize,
    seed: u64,
) -> Result<Vec<(Vec<usize>, Vec<usize>)>, PipelineError> {
    if k < 2 {
        return Err(PipelineError::EmptyInput("k_fold_indices requires k >= 2"));
    }
    let interval = n / k;
    if interval == 0 {
        return Err(PipelineError::ShapeMismatch {
            what: "fold count vs rows",
            left: k,
            right: n,
        });
    }

    let indices = permutation(n, seed);
    let folds = (0..k)
        .map(|fold| {
            let start = fold * interval;
            let end = start + interval;
            let val: Vec<usize> = indices[start..end].to_vec();
            let mut train: Vec<usize> = indices[..start].to_vec();
            train.extend_from_slice(&indices[end..]);
            (train, val)
        })
        .collect();
    Ok(folds)
}

/// Evaluate one hyperparameter combination with k-fold cross-validation.
pub fn k_fold_evaluate(
    x: &Array2<f64>,
    y: &Array1<f64>,
    params: &HyperParams,
    sentinel: f64,
    threshold: f64,
    seed: u64,
) -> anyhow::Result<CvScores> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            what: "features vs labels",
            left: x.nrows(),
            right: y.len(),
        }
        .into());
    }

    let folds = k_fold_indices(x.nrows(), params.folds, seed)?;
    let mut f1 = Vec::with_capacity(folds.len());
    let mut acc = Vec::with_capacity(folds.len());

    for (fold, (train_idx, val_idx)) in folds.iter().enumerate() {
        let x_train = x.select(Axis(0), train_idx);
        let y_train = y.select(Axis(0), train_idx);
        let x_val = x.select(Axis(0), val_idx);
        let y_val = y.select(Axis(0), val_idx);

        let y_pred = run_pipeline(&x_train, &y_train, &x_val, params, sentinel, threshold)?;
        let fold_f1 = f1_score(&y_val, &y_pred);
        let fold_acc = accuracy_score(&y_val, &y_pred);
        log::debug!(
            "fold {}: f1 {:.4}, accuracy {:.4} ({} train / {} val rows)",
            fold,
            fold_f1,
            fold_acc,
            train_idx.len(),
            val_idx.len()
        );
        f1.push(fold_f1);
        acc.push(fold_acc);
    }

    let (f1_mean, f1_std) = mean_std(&f1);
    let (acc_mean, acc_std) = mean_std(&acc);
    Ok(CvScores {
        f1_mean,
        f1_std,
        acc_mean,
        acc_std,
    })
}
