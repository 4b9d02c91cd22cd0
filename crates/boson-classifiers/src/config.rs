//! Configuration types for the grid search and the end-to-end pipeline.

use serde::{Deserialize, Serialize};

/// One hyperparameter combination, i.e. a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Polynomial expansion degree.
    pub degree: usize,
    /// Number of top-ranked variables used for interaction terms.
    pub top_k: usize,
    /// L2 regularization strength.
    pub lambda: f64,
    /// Gradient descent learning rate.
    pub gamma: f64,
    /// Fixed gradient descent iteration budget.
    pub max_iters: usize,
    /// Fold count for cross-validation.
    pub folds: usize,
}

/// Value lists for the six search axes.
///
/// `expand` enumerates the Cartesian product in a fixed nested order
/// (degree outermost, folds innermost) so record ordering is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchGrid {
    pub degrees: Vec<usize>,
    pub top_k: Vec<usize>,
    pub lambdas: Vec<f64>,
    pub gammas: Vec<f64>,
    pub max_iters: Vec<usize>,
    pub folds: Vec<usize>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        SearchGrid {
            degrees: vec![1, 2, 3, 4, 5, 6, 7, 8],
            top_k: vec![3, 4, 5, 6, 7, 8, 9, 10],
            lambdas: vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2, 1e-1, 1.0],
            gammas: vec![1e-7, 1e-6, 1e-5, 1e-4, 1e-3, 1e-2],
            max_iters: vec![100, 500, 1000, 2000, 50000],
            folds: vec![5, 7, 10],
        }
    }
}

impl SearchGrid {
    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.degrees.len()
            * self.top_k.len()
            * self.lambdas.len()
            * self.gammas.len()
            * self.max_iters.len()
            * self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every hyperparameter combination.
    pub fn expand(&self) -> Vec<HyperParams> {
        let mut cells = Vec::with_capacity(self.len());
        for &degree in &self.degrees {
            for &top_k in &self.top_k {
                for &lambda in &self.lambdas {
                    for &gamma in &self.gammas {
                        for &max_iters in &self.max_iters {
                            for &folds in &self.folds {
                                cells.push(HyperParams {
                                    degree,
                                    top_k,
                                    lambda,
                                    gamma,
                                    max_iters,
                                    folds,
                                });
                            }
                        }
                    }
                }
            }
        }
        cells
    }
}

/// Settings for the full per-group train/search/predict cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub grid: SearchGrid,
    /// Index of the categorical grouping column in the raw feature matrix.
    pub group_column: usize,
    /// Distinct group codes the router partitions on.
    pub group_codes: Vec<f64>,
    /// Fraction of each group's training rows held out from the search.
    pub holdout_ratio: f64,
    /// Raw encoding of "missing" in the input tables.
    pub sentinel: f64,
    /// Decision threshold on the predicted probability.
    pub threshold: f64,
    /// Seed for every shuffle the pipeline performs.
    pub seed: u64,
    /// Keep every k-th row on load when non-zero (smoke runs).
    pub sub_sample: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            grid: SearchGrid::default(),
            group_column: 22,
            group_codes: vec![0.0, 1.0, 2.0, 3.0],
            holdout_ratio: 0.1,
            sentinel: -999.0,
            threshold: 0.5,
            seed: 1,
            sub_sample: 0,
        }
    }
}
