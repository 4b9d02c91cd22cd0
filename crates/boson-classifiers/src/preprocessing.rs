//! Robust preprocessing: sentinel handling, column dropping, outlier
//! clipping, median/IQR standardization and zero imputation.
//!
//! Statistics are computed once on a training matrix (`RobustScaler::fit`)
//! and replayed unmodified on any paired test matrix (`transform`). The
//! transform is a pure function of `(matrix, scaler)`; it never looks at
//! the test distribution.

use ndarray::Array2;

use crate::error::PipelineError;
use crate::stats::{nan_percentile, nan_std};

/// Fitted per-column statistics for the robust transform.
#[derive(Debug, Clone)]
pub struct RobustScaler {
    /// Column count of the raw matrices this scaler was fitted on.
    n_input_cols: usize,
    /// Indices (into the raw matrix) of the columns that survive dropping.
    pub kept: Vec<usize>,
    /// Lower clip threshold per kept column, q1 - 1.5*IQR.
    pub lo: Vec<f64>,
    /// Upper clip threshold per kept column, q3 + 1.5*IQR.
    pub hi: Vec<f64>,
    pub median: Vec<f64>,
    /// IQR per kept column, clamped away from zero for the division.
    pub iqr: Vec<f64>,
    pub sentinel: f64,
}

impl RobustScaler {
    /// Guard for near-constant columns that survive the variance drop.
    const MIN_IQR: f64 = 1e-8;

    /// Fit statistics on a training matrix and transform it.
    ///
    /// Returns the cleaned matrix, the same-shape {0,1} imputation mask and
    /// the fitted scaler.
    pub fn fit(
        x: &Array2<f64>,
        sentinel: f64,
    ) -> Result<(Array2<f64>, Array2<f64>, RobustScaler), PipelineError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(PipelineError::EmptyInput("RobustScaler::fit"));
        }

        let masked = mask_sentinel(x, sentinel);

        // Drop columns that are entirely missing or have zero variance on
        // the training data. The surviving index set is what gets replayed
        // on test matrices.
        let kept: Vec<usize> = (0..masked.ncols())
            .filter(|&c| {
                let col = masked.column(c).to_vec();
                matches!(nan_std(&col), Some(std) if std > 0.0)
            })
            .collect();
        if kept.is_empty() {
            return Err(PipelineError::EmptyInput("all columns constant or missing"));
        }
        log::debug!(
            "RobustScaler: keeping {} of {} columns",
            kept.len(),
            masked.ncols()
        );

        let mut lo = Vec::with_capacity(kept.len());
        let mut hi = Vec::with_capacity(kept.len());
        let mut median = Vec::with_capacity(kept.len());
        let mut iqr = Vec::with_capacity(kept.len());
        for &c in &kept {
            let col = masked.column(c).to_vec();
            // Kept columns have at least one finite entry by construction.
            let q1 = nan_percentile(&col, 25.0).expect("kept column has finite entries");
            let med = nan_percentile(&col, 50.0).expect("kept column has finite entries");
            let q3 = nan_percentile(&col, 75.0).expect("kept column has finite entries");
            let range = q3 - q1;
            lo.push(q1 - 1.5 * range);
            hi.push(q3 + 1.5 * range);
            median.push(med);
            iqr.push(range.max(Self::MIN_IQR));
        }

        let scaler = RobustScaler {
            n_input_cols: x.ncols(),
            kept,
            lo,
            hi,
            median,
            iqr,
            sentinel,
        };
        let (clean, mask) = scaler.apply(&masked);
        Ok((clean, mask, scaler))
    }

    /// Transform a matrix with the fitted training statistics.
    pub fn transform(&self, x: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>), PipelineError> {
        if x.ncols() != self.n_input_cols {
            return Err(PipelineError::ShapeMismatch {
                what: "transform columns vs fitted columns",
                left: x.ncols(),
                right: self.n_input_cols,
            });
        }
        Ok(self.apply(&mask_sentinel(x, self.sentinel)))
    }

    /// Shared clip/standardize/impute path over a sentinel-masked matrix.
    fn apply(&self, masked: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let nrows = masked.nrows();
        let ncols = self.kept.len();
        let mut clean = Array2::<f64>::zeros((nrows, ncols));
        let mut mask = Array2::<f64>::zeros((nrows, ncols));

        for (out_c, &c) in self.kept.iter().enumerate() {
            for r in 0..nrows {
                let v = masked[[r, c]];
                if v.is_nan() {
                    // Post-standardization the median sits at zero, so zero
                    // imputation is median imputation.
                    clean[[r, out_c]] = 0.0;
                    mask[[r, out_c]] = 1.0;
                } else {
                    let clipped = v.min(self.hi[out_c]).max(self.lo[out_c]);
                    clean[[r, out_c]] = (clipped - self.median[out_c]) / self.iqr[out_c];
                }
            }
        }
        (clean, mask)
    }
}

/// Replace the reserved sentinel value with NaN "missing" markers.
pub fn mask_sentinel(x: &Array2<f64>, sentinel: f64) -> Array2<f64> {
    x.mapv(|v| if v == sentinel { f64::NAN } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn sentinel_becomes_nan() {
        let x = arr2(&[[1.0, -999.0], [2.0, 3.0]]);
        let masked = mask_sentinel(&x, -999.0);
        assert!(masked[[0, 1]].is_nan());
        assert_eq!(masked[[1, 1]], 3.0);
    }

    #[test]
    fn near_constant_column_does_not_divide_by_zero() {
        // Tiny but nonzero variance: survives the drop, IQR may be zero.
        let x = arr2(&[
            [1.0, 5.0],
            [2.0, 5.0],
            [3.0, 5.0],
            [4.0, 5.0 + 1e-12],
        ]);
        let (clean, _mask, _scaler) = RobustScaler::fit(&x, -999.0).unwrap();
        assert!(clean.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn outliers_are_clipped_to_train_thresholds() {
        let x = arr2(&[[1.0], [2.0], [3.0], [4.0], [1000.0]]);
        let (_clean, _mask, scaler) = RobustScaler::fit(&x, -999.0).unwrap();
        let (t, _m) = scaler.transform(&arr2(&[[1000.0], [-1000.0]])).unwrap();
        let hi_std = (scaler.hi[0] - scaler.median[0]) / scaler.iqr[0];
        let lo_std = (scaler.lo[0] - scaler.median[0]) / scaler.iqr[0];
        assert!((t[[0, 0]] - hi_std).abs() < 1e-12);
        assert!((t[[1, 0]] - lo_std).abs() < 1e-12);
    }
}
