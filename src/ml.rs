//! Estimators, cross-validation, score intervals and hyperparameter search.

pub mod boosting;
pub mod catalog;
pub mod cross_validation;
pub mod estimator;
pub mod forest;
pub mod linalg;
pub mod linear;
pub mod mlp;
pub mod naive_bayes;
pub mod params;
pub mod pca;
pub mod stats;
pub mod tree;
pub mod tuning;

pub use catalog::ModelSpec;
pub use cross_validation::{cross_validate, CvOutcome, KFold};
pub use estimator::Estimator;
pub use params::{Hyperparams, ParamValue};
pub use stats::ScoreInterval;
