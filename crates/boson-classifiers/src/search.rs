//! Exhaustive hyperparameter grid search.
//!
//! Every cell of the Cartesian product is evaluated independently; the
//! rayon map preserves grid order in the collected records, so tie-breaking
//! by first-seen order stays deterministic regardless of which worker
//! finishes first. A failed cell records sentinel scores instead of
//! aborting the whole search.

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{HyperParams, SearchGrid};
use crate::cross_validation::{k_fold_evaluate, CvScores};

/// One evaluated grid cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchRecord {
    pub params: HyperParams,
    pub scores: CvScores,
}

/// Evaluate every combination in the grid with k-fold cross-validation.
pub fn run_grid_search(
    x: &Array2<f64>,
    y: &Array1<f64>,
    grid: &SearchGrid,
    sentinel: f64,
    threshold: f64,
    seed: u64,
) -> Vec<SearchRecord> {
    let cells = grid.expand();
    log::info!(
        "grid search: {} configurations over {} rows",
        cells.len(),
        x.nrows()
    );

    cells
        .into_par_iter()
        .map(|params| {
            let scores = match k_fold_evaluate(x, y, &params, sentinel, threshold, seed) {
                Ok(scores) => scores,
                Err(err) => {
                    log::warn!("grid cell {:?} failed: {:#}", params, err);
                    CvScores::sentinel()
                }
            };
            log::debug!(
                "cell {:?}: f1 {:.4} +/- {:.4}",
                params,
                scores.f1_mean,
                scores.f1_std
            );
            SearchRecord { params, scores }
        })
        .collect()
}

/// Record with the highest mean F1; ties keep the first-seen record.
pub fn best_record(records: &[SearchRecord]) -> Option<&SearchRecord> {
    let mut best: Option<&SearchRecord> = None;
    for record in records {
        if !record.scores.f1_mean.is_finite() {
            continue;
        }
        match best {
            Some(current) if record.scores.f1_mean <= current.scores.f1_mean => {}
            _ => best = Some(record),
        }
    }
    best
}
