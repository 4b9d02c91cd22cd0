//! boson-classifiers: signal/background classification for tabular event data.
//!
//! This crate implements the full supervised pipeline for binary
//! classification of physics events: robust preprocessing of raw feature
//! tables, polynomial/interaction feature engineering, a regularized
//! logistic-regression optimizer, deterministic train/validation
//! partitioning, k-fold cross-validation and an exhaustive (rayon-parallel)
//! hyperparameter grid search, optionally routed per categorical group.
//!
//! The design favors small, testable modules; all heavy loops are
//! side-effect-free so the grid search can fan out across a worker pool.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod search;
pub mod stats;
