//! Nan-aware column statistics and binary classification metrics.
//!
//! The percentile and standard-deviation helpers ignore NaN entries, which
//! is how missing values are encoded after sentinel replacement. Percentiles
//! use linear interpolation between the two nearest order statistics.

use ndarray::Array1;

/// Percentile of the finite entries of `values`, `q` in [0, 100].
///
/// Returns `None` when no finite entry exists.
pub fn nan_percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).expect("finite values are comparable"));

    let n = finite.len();
    if n == 1 {
        return Some(finite[0]);
    }
    let rank = q / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(finite[lo])
    } else {
        let frac = rank - lo as f64;
        Some(finite[lo] + (finite[hi] - finite[lo]) * frac)
    }
}

/// Population standard deviation of the finite entries of `values`.
///
/// Returns `None` when no finite entry exists.
pub fn nan_std(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(var.sqrt())
}

/// Mean and population standard deviation of a slice of scores.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fne = 0;
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        let t = t > 0.5;
        let p = p > 0.5;
        match (t, p) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fne += 1,
        }
    }
    (tp, fp, tn, fne)
}

/// Binary F1 score over {0,1} label vectors.
pub fn f1_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "f1_score requires equal length vectors"
    );
    let (tp, fp, _tn, fne) = confusion_counts(y_true, y_pred);
    if tp == 0 {
        return 0.0;
    }
    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fne) as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Binary accuracy over {0,1} label vectors.
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "accuracy_score requires equal length vectors"
    );
    if y_true.is_empty() {
        return 0.0;
    }
    let (tp, _fp, tn, _fne) = confusion_counts(y_true, y_pred);
    (tp + tn) as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(nan_percentile(&values, 50.0), Some(2.5));
        assert_eq!(nan_percentile(&values, 0.0), Some(1.0));
        assert_eq!(nan_percentile(&values, 100.0), Some(4.0));
        assert_eq!(nan_percentile(&values, 25.0), Some(1.75));
    }

    #[test]
    fn percentile_ignores_nan() {
        let values = vec![f64::NAN, 1.0, f64::NAN, 3.0];
        assert_eq!(nan_percentile(&values, 50.0), Some(2.0));
        assert_eq!(nan_percentile(&[f64::NAN, f64::NAN], 50.0), None);
    }

    #[test]
    fn std_ignores_nan() {
        let values = vec![2.0, f64::NAN, 2.0, 2.0];
        assert_eq!(nan_std(&values), Some(0.0));
        let values = vec![1.0, 3.0];
        assert!((nan_std(&values).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(nan_std(&[f64::NAN]), None);
    }

    #[test]
    fn mean_std_population() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((std - (1.25f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn f1_and_accuracy_basic() {
        let y_true = Array1::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        let y_pred = Array1::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        // tp=1 fp=1 fn=1 tn=1 -> precision=recall=0.5 -> f1=0.5
        assert!((f1_score(&y_true, &y_pred) - 0.5).abs() < 1e-12);
        assert!((accuracy_score(&y_true, &y_pred) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn f1_zero_when_no_true_positives() {
        let y_true = Array1::from_vec(vec![1.0, 1.0]);
        let y_pred = Array1::from_vec(vec![0.0, 0.0]);
        assert_eq!(f1_score(&y_true, &y_pred), 0.0);
    }
}
