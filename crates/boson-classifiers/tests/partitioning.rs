//! Integration tests for deterministic shuffling and splitting.

use boson_classifiers::data_handling::{permutation, split_train_test};
use ndarray::{arr2, Array1};

#[test]
fn sentinel_scenario_split_is_reproducible() {
    // Three rows, one sentinel-encoded entry; ratio 0.5 and seed 1 must
    // always yield the same assignment: ceil(0.5 * 3) = 2 train rows.
    let x = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, -999.0]]);
    let y = Array1::from_vec(vec![0.0, 1.0, 1.0]);

    let (x_tr, x_val, y_tr, y_val) = split_train_test(&x, &y, 0.5, 1).unwrap();
    assert_eq!(x_tr.nrows(), 2);
    assert_eq!(x_val.nrows(), 1);
    assert_eq!(y_tr.len(), 2);
    assert_eq!(y_val.len(), 1);

    // The assignment is exactly the seeded permutation split at 2.
    let perm = permutation(3, 1);
    for (out_row, &src) in perm[..2].iter().enumerate() {
        assert_eq!(x_tr.row(out_row).to_vec(), x.row(src).to_vec());
        assert_eq!(y_tr[out_row], y[src]);
    }
    assert_eq!(x_val.row(0).to_vec(), x.row(perm[2]).to_vec());
    assert_eq!(y_val[0], y[perm[2]]);

    // Byte-identical across repeated runs.
    let (x_tr2, x_val2, y_tr2, y_val2) = split_train_test(&x, &y, 0.5, 1).unwrap();
    assert_eq!(x_tr, x_tr2);
    assert_eq!(x_val, x_val2);
    assert_eq!(y_tr, y_tr2);
    assert_eq!(y_val, y_val2);
}

#[test]
fn split_point_rounds_up() {
    let x = arr2(&[[1.0], [2.0], [3.0], [4.0], [5.0]]);
    let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0, 0.0]);
    // ceil(0.5 * 5) = 3 rows to train.
    let (x_tr, x_val, _y_tr, _y_val) = split_train_test(&x, &y, 0.5, 7).unwrap();
    assert_eq!(x_tr.nrows(), 3);
    assert_eq!(x_val.nrows(), 2);
}

#[test]
fn different_seeds_give_different_permutations() {
    assert_ne!(permutation(50, 1), permutation(50, 2));
}

#[test]
fn split_rejects_misaligned_inputs() {
    let x = arr2(&[[1.0], [2.0]]);
    let y = Array1::from_vec(vec![0.0, 1.0, 1.0]);
    assert!(split_train_test(&x, &y, 0.5, 1).is_err());
}
