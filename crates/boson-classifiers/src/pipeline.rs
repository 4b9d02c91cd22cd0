//! End-to-end orchestration: single-shot pipeline runs, best-config
//! refitting and the per-group router.
//!
//! Each group's cycle is fully independent: its own fitted statistics,
//! selected indices and weights. Nothing is shared across groups.

use anyhow::Context;
use ndarray::{Array1, Array2};

use crate::config::{HyperParams, PipelineConfig};
use crate::data_handling::{split_train_test, Dataset};
use crate::error::PipelineError;
use crate::features::{expand_test, expand_train};
use crate::models::logistic::{predict, LogisticRegression};
use crate::preprocessing::RobustScaler;
use crate::search::{best_record, run_grid_search, SearchRecord};
use crate::stats::f1_score;

/// Everything needed to score unseen rows: fitted preprocessing
/// statistics, the replayable selected-index sequence and the weights.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub scaler: RobustScaler,
    pub selected: Vec<usize>,
    pub degree: usize,
    pub weights: Array1<f64>,
    pub threshold: f64,
}

impl FittedModel {
    /// Transform, expand and score a raw test matrix.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        let (clean, _mask) = self.scaler.transform(x)?;
        let expanded = expand_test(&clean, self.degree, &self.selected)?;
        if expanded.ncols() != self.weights.len() {
            return Err(PipelineError::ShapeMismatch {
                what: "expanded test columns vs weights",
                left: expanded.ncols(),
                right: self.weights.len(),
            });
        }
        Ok(predict(&self.weights, &expanded, self.threshold))
    }
}

/// Preprocess, expand and fit on training data only.
///
/// Returns the fitted model so the exact statistics and index sequence can
/// be replayed on held-out rows later.
pub fn run_fit(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    params: &HyperParams,
    sentinel: f64,
    threshold: f64,
) -> Result<FittedModel, PipelineError> {
    let (clean, _mask, scaler) = RobustScaler::fit(x_train, sentinel)?;
    let (expanded, selected) = expand_train(&clean, y_train, params.degree, params.top_k)?;

    let model = LogisticRegression::new(params.lambda, params.gamma, params.max_iters);
    let (weights, loss) = model.fit(&expanded, y_train, Array1::zeros(expanded.ncols()))?;
    log::debug!(
        "run_fit: {} expanded columns, final loss {:.6}",
        expanded.ncols(),
        loss
    );

    Ok(FittedModel {
        scaler,
        selected,
        degree: params.degree,
        weights,
        threshold,
    })
}

/// Fit on the training matrix and predict labels for the test matrix.
pub fn run_pipeline(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    params: &HyperParams,
    sentinel: f64,
    threshold: f64,
) -> Result<Array1<f64>, PipelineError> {
    let fitted = run_fit(x_train, y_train, params, sentinel, threshold)?;
    fitted.predict(x_test)
}

/// Outcome of one group's independent train/search/predict cycle.
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    pub code: f64,
    pub records: Vec<SearchRecord>,
    pub best: HyperParams,
    pub ids: Array1<i64>,
    pub predictions: Array1<f64>,
}

/// Split a training dataset on the grouping column and run the full
/// search/refit/predict cycle per group code.
///
/// Groups with no training or no test rows are skipped.
pub fn run_groups(
    train: &Dataset,
    test: &Dataset,
    cfg: &PipelineConfig,
) -> anyhow::Result<Vec<GroupOutcome>> {
    let mut outcomes = Vec::with_capacity(cfg.group_codes.len());
    for &code in &cfg.group_codes {
        match run_single_group(train, test, code, cfg)
            .with_context(|| format!("group {}", code))?
        {
            Some(outcome) => outcomes.push(outcome),
            None => continue,
        }
    }
    Ok(outcomes)
}

fn run_single_group(
    train: &Dataset,
    test: &Dataset,
    code: f64,
    cfg: &PipelineConfig,
) -> anyhow::Result<Option<GroupOutcome>> {
    let train_sub = train.filter_by_group(cfg.group_column, code);
    let test_sub = test.filter_by_group(cfg.group_column, code);
    if train_sub.nrows() == 0 {
        log::warn!("group {}: no training rows, skipping", code);
        return Ok(None);
    }
    if test_sub.nrows() == 0 {
        log::warn!("group {}: no test rows, skipping", code);
        return Ok(None);
    }
    train_sub.log_summary(&format!("group {}", code));

    // Hold a slice of the group's rows out of the search entirely so the
    // chosen configuration can be sanity-checked on unseen data.
    let (x_tr, x_val, y_tr, y_val) = split_train_test(
        &train_sub.x,
        &train_sub.y,
        1.0 - cfg.holdout_ratio,
        cfg.seed,
    )?;

    let records = run_grid_search(&x_tr, &y_tr, &cfg.grid, cfg.sentinel, cfg.threshold, cfg.seed);
    let best = best_record(&records)
        .ok_or(PipelineError::EmptyInput("no grid cell produced a score"))?;
    let best = best.params;
    log::info!("group {}: best configuration {:?}", code, best);

    let fitted = run_fit(&x_tr, &y_tr, &best, cfg.sentinel, cfg.threshold)?;

    if x_val.nrows() > 0 {
        let holdout_pred = fitted.predict(&x_val)?;
        log::info!(
            "group {}: holdout f1 {:.4} over {} rows",
            code,
            f1_score(&y_val, &holdout_pred),
            x_val.nrows()
        );
    }

    let predictions = fitted.predict(&test_sub.x)?;
    Ok(Some(GroupOutcome {
        code,
        records,
        best,
        ids: test_sub.ids,
        predictions,
    }))
}

/// Concatenate per-group predictions back into one (ids, predictions) pair,
/// in group-code order.
pub fn concat_predictions(outcomes: &[GroupOutcome]) -> (Array1<i64>, Array1<f64>) {
    let total: usize = outcomes.iter().map(|o| o.ids.len()).sum();
    let mut ids = Vec::with_capacity(total);
    let mut preds = Vec::with_capacity(total);
    for outcome in outcomes {
        ids.extend(outcome.ids.iter().copied());
        preds.extend(outcome.predictions.iter().copied());
    }
    (Array1::from_vec(ids), Array1::from_vec(preds))
}
