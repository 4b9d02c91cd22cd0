//! Polynomial basis expansion, top-variable selection and pairwise
//! interaction terms.
//!
//! The column layout is fixed and must be byte-identical between train and
//! test time: `expand_train` returns the ordered index sequence it selected
//! and `expand_test` replays exactly that sequence. Interaction columns are
//! appended by iterating i, then j, over the selected indices in selector
//! order, keeping only pairs with i > j.

use ndarray::{Array1, Array2};

use crate::error::PipelineError;
use crate::models::logistic::LogisticRegression;

/// Hyperparameters of the throwaway ranking fit in `select_top_vars`.
const RANKING_LAMBDA: f64 = 0.01;
const RANKING_GAMMA: f64 = 1e-6;
const RANKING_ITERS: usize = 100;

/// Powers 1..=degree of every column, degree-major blocks, no bias column.
///
/// Output layout: `[X^1 | X^2 | ... | X^degree]`.
pub fn build_poly(x: &Array2<f64>, degree: usize) -> Array2<f64> {
    let degree = degree.max(1);
    let (nrows, ncols) = (x.nrows(), x.ncols());
    let mut data = Vec::with_capacity(nrows * ncols * degree);
    for r in 0..nrows {
        for d in 1..=degree {
            for c in 0..ncols {
                data.push(x[[r, c]].powi(d as i32));
            }
        }
    }
    Array2::from_shape_vec((nrows, ncols * degree), data)
        .expect("build_poly: row-major buffer matches shape")
}

/// Rank columns by |weight| of a short regularized logistic fit and take
/// the `top_k` strongest, ties broken by original column order.
pub fn select_top_vars(
    x: &Array2<f64>,
    y: &Array1<f64>,
    top_k: usize,
) -> Result<Vec<usize>, PipelineError> {
    let model = LogisticRegression::new(RANKING_LAMBDA, RANKING_GAMMA, RANKING_ITERS);
    let (w, _loss) = model.fit(x, y, Array1::zeros(x.ncols()))?;

    let magnitude: Vec<f64> = w.iter().map(|v| v.abs()).collect();
    let mut indices: Vec<usize> = (0..x.ncols()).collect();
    // Stable sort: equal magnitudes keep original column order.
    indices.sort_by(|&a, &b| {
        magnitude[b]
            .partial_cmp(&magnitude[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(top_k.min(x.ncols()));
    Ok(indices)
}

/// Append `X[:,i] * X[:,j]` for every pair of selected indices with i > j.
pub fn add_interactions(
    x: &Array2<f64>,
    selected: &[usize],
) -> Result<Array2<f64>, PipelineError> {
    if let Some(&bad) = selected.iter().find(|&&i| i >= x.ncols()) {
        return Err(PipelineError::ShapeMismatch {
            what: "selected index vs expanded columns",
            left: bad,
            right: x.ncols(),
        });
    }

    let pairs: Vec<(usize, usize)> = selected
        .iter()
        .flat_map(|&i| selected.iter().filter(move |&&j| i > j).map(move |&j| (i, j)))
        .collect();

    let nrows = x.nrows();
    let ncols = x.ncols() + pairs.len();
    let mut data = Vec::with_capacity(nrows * ncols);
    for r in 0..nrows {
        data.extend(x.row(r).iter().copied());
        for &(i, j) in &pairs {
            data.push(x[[r, i]] * x[[r, j]]);
        }
    }
    Ok(Array2::from_shape_vec((nrows, ncols), data)
        .expect("add_interactions: row-major buffer matches shape"))
}

/// Train-time expansion: polynomial basis, top-variable selection on the
/// basis, then interactions over the selected indices.
pub fn expand_train(
    x: &Array2<f64>,
    y: &Array1<f64>,
    degree: usize,
    top_k: usize,
) -> Result<(Array2<f64>, Vec<usize>), PipelineError> {
    let poly = build_poly(x, degree);
    let selected = select_top_vars(&poly, y, top_k)?;
    let expanded = add_interactions(&poly, &selected)?;
    Ok((expanded, selected))
}

/// Test-time expansion replaying the exact index sequence from training.
pub fn expand_test(
    x: &Array2<f64>,
    degree: usize,
    selected: &[usize],
) -> Result<Array2<f64>, PipelineError> {
    let poly = build_poly(x, degree);
    add_interactions(&poly, selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn build_poly_layout_is_degree_major() {
        let x = arr2(&[[2.0, 3.0]]);
        let poly = build_poly(&x, 3);
        assert_eq!(poly.shape(), &[1, 6]);
        assert_eq!(
            poly.row(0).to_vec(),
            vec![2.0, 3.0, 4.0, 9.0, 8.0, 27.0]
        );
    }

    #[test]
    fn interactions_follow_selector_order() {
        let x = arr2(&[[1.0, 2.0, 3.0, 4.0]]);
        // Selector order 2, 0, 3: pairs with i > j in iteration order are
        // (2,0), (3,2), (3,0).
        let out = add_interactions(&x, &[2, 0, 3]).unwrap();
        assert_eq!(out.shape(), &[1, 7]);
        assert_eq!(out[[0, 4]], 3.0 * 1.0);
        assert_eq!(out[[0, 5]], 4.0 * 3.0);
        assert_eq!(out[[0, 6]], 4.0 * 1.0);
    }

    #[test]
    fn add_interactions_rejects_out_of_range_index() {
        let x = arr2(&[[1.0, 2.0]]);
        assert!(add_interactions(&x, &[5]).is_err());
    }

    #[test]
    fn train_and_test_expansions_agree_on_shape() {
        let x_train = arr2(&[
            [0.1, 1.0, -0.4],
            [0.4, -1.0, 0.2],
            [-0.6, 1.0, 0.9],
            [0.9, -1.0, -0.7],
            [1.2, 1.0, 0.3],
            [-1.5, -1.0, -0.2],
        ]);
        let y = ndarray::Array1::from_vec(vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let (expanded, selected) = expand_train(&x_train, &y, 2, 3).unwrap();
        assert_eq!(selected.len(), 3);

        let x_test = arr2(&[[0.5, 1.0, 0.0], [-0.3, -1.0, 0.8]]);
        let test_expanded = expand_test(&x_test, 2, &selected).unwrap();
        assert_eq!(test_expanded.nrows(), x_test.nrows());
        assert_eq!(test_expanded.ncols(), expanded.ncols());
    }

    #[test]
    fn top_k_is_clamped_to_column_count() {
        let x = arr2(&[[1.0, 2.0], [-1.0, 1.0], [2.0, -2.0], [-2.0, -1.0]]);
        let y = ndarray::Array1::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        let selected = select_top_vars(&x, &y, 10).unwrap();
        assert_eq!(selected.len(), 2);
    }
}
