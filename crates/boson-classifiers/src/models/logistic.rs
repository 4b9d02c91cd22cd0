//! L2-regularized logistic regression fitted with full-batch gradient
//! descent.
//!
//! The iteration budget is fixed: the optimizer runs exactly `max_iters`
//! steps with no early stopping, which keeps repeated fits byte-for-byte
//! reproducible for the cross-validator and the grid search.

use ndarray::{Array1, Array2};

use crate::error::PipelineError;

/// Numerically stable sigmoid; never overflows for large |z|.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Stable log(1 + exp(z)).
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogisticRegression {
    pub lambda: f64,
    pub gamma: f64,
    pub max_iters: usize,
}

impl LogisticRegression {
    pub fn new(lambda: f64, gamma: f64, max_iters: usize) -> Self {
        LogisticRegression {
            lambda,
            gamma,
            max_iters,
        }
    }

    /// Fit weights against `y` in {0,1}.
    ///
    /// Returns the weight vector and the final penalized negative
    /// log-likelihood. A non-finite result is an error rather than a
    /// silently propagated NaN.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        initial_w: Array1<f64>,
    ) -> Result<(Array1<f64>, f64), PipelineError> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                what: "features vs labels",
                left: x.nrows(),
                right: y.len(),
            });
        }
        if x.ncols() != initial_w.len() {
            return Err(PipelineError::ShapeMismatch {
                what: "feature columns vs initial weights",
                left: x.ncols(),
                right: initial_w.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyInput("LogisticRegression::fit"));
        }

        let mut w = initial_w;
        for _ in 0..self.max_iters {
            let z = x.dot(&w);
            let p = z.mapv(sigmoid);
            let grad = x.t().dot(&(&p - y)) + &w * (2.0 * self.lambda);
            w = w - grad * self.gamma;
        }

        let loss = self.loss(x, y, &w);
        if !loss.is_finite() || w.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::NonFiniteModel);
        }
        log::trace!("fit finished after {} iters, loss {:.6}", self.max_iters, loss);
        Ok((w, loss))
    }

    /// Penalized negative log-likelihood at `w`.
    pub fn loss(&self, x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>) -> f64 {
        let z = x.dot(w);
        let nll: f64 = z
            .iter()
            .zip(y.iter())
            .map(|(&z, &y)| softplus(z) - y * z)
            .sum();
        nll + self.lambda * w.dot(w)
    }
}

/// Predicted probabilities sigmoid(X.w).
pub fn predict_proba(w: &Array1<f64>, x: &Array2<f64>) -> Array1<f64> {
    x.dot(w).mapv(sigmoid)
}

/// Hard {0,1} labels: 1 iff sigmoid(X.w) >= threshold.
pub fn predict(w: &Array1<f64>, x: &Array2<f64>, threshold: f64) -> Array1<f64> {
    predict_proba(w, x).mapv(|p| if p >= threshold { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn sigmoid_tails_do_not_overflow() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(750.0).is_finite());
        assert!(sigmoid(-750.0).is_finite());
    }

    #[test]
    fn fit_learns_sign_of_a_separable_feature() {
        let x = arr2(&[[-2.0], [-1.0], [1.0], [2.0]]);
        let y = Array1::from_vec(vec![0.0, 0.0, 1.0, 1.0]);
        let model = LogisticRegression::new(0.0, 0.5, 500);
        let (w, loss) = model.fit(&x, &y, Array1::zeros(1)).unwrap();
        assert!(w[0] > 0.0, "weight should be positive, got {}", w[0]);
        assert!(loss.is_finite());
        let preds = predict(&w, &x, 0.5);
        assert_eq!(preds.to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn fit_rejects_shape_mismatch() {
        let x = arr2(&[[1.0], [2.0]]);
        let y = Array1::from_vec(vec![0.0, 1.0, 1.0]);
        let model = LogisticRegression::new(0.01, 0.1, 10);
        assert!(model.fit(&x, &y, Array1::zeros(1)).is_err());
    }

    #[test]
    fn divergent_fit_is_an_error_not_nan() {
        // |1 - 2*gamma*lambda| >> 1 makes the weight norm blow up
        // geometrically, so the fit must report NonFiniteModel.
        let x = arr2(&[[1.0], [-1.0]]);
        let y = Array1::from_vec(vec![1.0, 0.0]);
        let model = LogisticRegression::new(1e3, 1.0, 300);
        let err = model.fit(&x, &y, Array1::from_vec(vec![1.0]));
        assert!(matches!(err, Err(PipelineError::NonFiniteModel)));
    }
}
