//! Model implementations. Only regularized logistic regression is
//! supported; the grid search and pipeline are written against it directly.
pub mod logistic;

pub use logistic::{predict, predict_proba, LogisticRegression};
