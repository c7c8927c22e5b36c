//! Default hyperparameters per model and construction of configured estimators.
//!
//! Command-line overrides are merged over the defaults; keys a model does not know
//! are reported and dropped before anything is built.

use crate::error::ShellError;
use crate::ml::boosting::GradientBoostingClassifier;
use crate::ml::estimator::Estimator;
use crate::ml::forest::RandomForest;
use crate::ml::linear::{LinearRegression, LogisticRegression};
use crate::ml::mlp::{MlpClassifier, MlpParams, MlpRegressor};
use crate::ml::naive_bayes::GaussianNaiveBayes;
use crate::ml::params::{Hyperparams, ParamValue};
use crate::ml::tree::{Criterion, DecisionTree, MaxFeatures, TreeParams};
use crate::project::kind::ModelKind;
use crate::shell::envelope::Diagnostics;

fn int(value: i64) -> ParamValue {
    ParamValue::Int(value)
}

fn float(value: f64) -> ParamValue {
    ParamValue::Float(value)
}

fn text(value: &str) -> ParamValue {
    ParamValue::Text(value.to_string())
}

/// Every hyperparameter a model accepts, with its default.
pub fn defaults(kind: ModelKind) -> Hyperparams {
    let pairs: Vec<(&str, ParamValue)> = match kind {
        ModelKind::LinearRegression => vec![("fit_intercept", ParamValue::Bool(true))],
        ModelKind::MlpRegressor | ModelKind::MlpClassifier => vec![
            ("hidden_layer_sizes", ParamValue::List(vec!["100".to_string()])),
            ("alpha", float(1e-4)),
            ("learning_rate_init", float(1e-3)),
            ("max_iter", int(200)),
            ("batch_size", text("auto")),
            ("tol", float(1e-4)),
            ("n_iter_no_change", int(10)),
            ("shuffle", ParamValue::Bool(true)),
        ],
        ModelKind::NaiveBayes => vec![("var_smoothing", float(1e-9))],
        ModelKind::LogisticRegression => vec![
            ("c", float(1.0)),
            ("max_iter", int(500)),
            ("tol", float(1e-4)),
            ("fit_intercept", ParamValue::Bool(true)),
        ],
        ModelKind::DecisionTree => vec![
            ("criterion", text("gini")),
            ("max_depth", text("none")),
            ("min_samples_split", int(2)),
            ("min_samples_leaf", int(1)),
            ("max_features", text("none")),
        ],
        ModelKind::RandomForest => vec![
            ("n_estimators", int(100)),
            ("criterion", text("gini")),
            ("max_depth", text("none")),
            ("min_samples_split", int(2)),
            ("min_samples_leaf", int(1)),
            ("max_features", text("sqrt")),
            ("bootstrap", ParamValue::Bool(true)),
        ],
        ModelKind::GradientBoosting => vec![
            ("n_estimators", int(100)),
            ("learning_rate", float(0.1)),
            ("max_depth", int(3)),
            ("min_samples_split", int(2)),
            ("min_samples_leaf", int(1)),
        ],
    };
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Hyperparameters searched by `tune` and `runall`.
pub fn tunables(kind: ModelKind) -> &'static [&'static str] {
    match kind {
        ModelKind::LinearRegression => &["fit_intercept"],
        ModelKind::MlpRegressor | ModelKind::MlpClassifier => &["hidden_layer_sizes", "alpha"],
        ModelKind::NaiveBayes => &["var_smoothing"],
        ModelKind::LogisticRegression => &["max_iter", "fit_intercept"],
        ModelKind::DecisionTree => &["min_samples_split", "min_samples_leaf"],
        ModelKind::RandomForest => &["n_estimators", "min_samples_leaf", "bootstrap"],
        ModelKind::GradientBoosting => &["learning_rate", "max_depth"],
    }
}

/// A model together with its resolved hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    params: Hyperparams,
    overrides: Hyperparams,
}

impl ModelSpec {
    /// Merge `overrides` over the defaults, warning about keys the model does not accept.
    pub fn new(kind: ModelKind, overrides: &Hyperparams, diagnostics: &mut Diagnostics) -> Self {
        let mut params = defaults(kind);
        let mut accepted = Hyperparams::new();
        for (key, value) in overrides {
            if params.contains_key(key) {
                params.insert(key.clone(), value.clone());
                accepted.insert(key.clone(), value.clone());
            } else {
                diagnostics.warn(format!(
                    "Unknown hyperparameter {} for {}; ignoring it.",
                    key,
                    kind.command()
                ));
            }
        }
        Self {
            kind,
            params,
            overrides: accepted,
        }
    }

    pub fn params(&self) -> &Hyperparams {
        &self.params
    }

    /// Only the values that were set explicitly.
    pub fn overrides(&self) -> &Hyperparams {
        &self.overrides
    }

    /// Construct an unfitted estimator. `seed` drives every stochastic component.
    pub fn build(&self, n_classes: usize, seed: u64) -> Result<Box<dyn Estimator>, ShellError> {
        let model: Box<dyn Estimator> = match self.kind {
            ModelKind::LinearRegression => {
                Box::new(LinearRegression::new(self.bool("fit_intercept")?))
            }
            ModelKind::MlpRegressor => Box::new(MlpRegressor::new(self.mlp_params(seed)?)),
            ModelKind::MlpClassifier => {
                Box::new(MlpClassifier::new(n_classes, self.mlp_params(seed)?))
            }
            ModelKind::NaiveBayes => {
                let mut model = GaussianNaiveBayes::new(n_classes);
                model.var_smoothing = self.non_negative("var_smoothing")?;
                Box::new(model)
            }
            ModelKind::LogisticRegression => {
                let mut model = LogisticRegression::new(n_classes);
                model.c = self.positive("c")?;
                model.max_iter = self.usize("max_iter")?;
                model.tol = self.non_negative("tol")?;
                model.fit_intercept = self.bool("fit_intercept")?;
                Box::new(model)
            }
            ModelKind::DecisionTree => {
                Box::new(DecisionTree::classifier(n_classes, self.tree_params(seed)?))
            }
            ModelKind::RandomForest => {
                let tree = self.tree_params(seed)?;
                let mut forest = RandomForest::new(n_classes);
                forest.n_estimators = self.usize("n_estimators")?;
                forest.max_depth = tree.max_depth;
                forest.min_samples_split = tree.min_samples_split;
                forest.min_samples_leaf = tree.min_samples_leaf;
                forest.max_features = tree.max_features;
                forest.criterion = tree.criterion;
                forest.bootstrap = self.bool("bootstrap")?;
                forest.random_state = seed;
                Box::new(forest)
            }
            ModelKind::GradientBoosting => {
                let mut model = GradientBoostingClassifier::new(n_classes);
                model.n_estimators = self.usize("n_estimators")?;
                model.learning_rate = self.positive("learning_rate")?;
                model.max_depth = self.usize("max_depth")?;
                model.min_samples_split = self.usize("min_samples_split")?;
                model.min_samples_leaf = self.usize("min_samples_leaf")?;
                model.random_state = seed;
                Box::new(model)
            }
        };
        Ok(model)
    }

    fn mlp_params(&self, seed: u64) -> Result<MlpParams, ShellError> {
        let hidden_layer_sizes = self
            .value("hidden_layer_sizes")?
            .as_sizes()
            .ok_or_else(|| self.invalid("hidden_layer_sizes", "a list of layer sizes"))?;
        let batch_size = match self.value("batch_size")? {
            ParamValue::Text(t) if t == "auto" => None,
            other => Some(
                other
                    .as_usize()
                    .ok_or_else(|| self.invalid("batch_size", "a positive integer or auto"))?,
            ),
        };
        Ok(MlpParams {
            hidden_layer_sizes,
            alpha: self.non_negative("alpha")?,
            learning_rate_init: self.positive("learning_rate_init")?,
            max_iter: self.usize("max_iter")?,
            batch_size,
            tol: self.non_negative("tol")?,
            n_iter_no_change: self.usize("n_iter_no_change")?,
            shuffle: self.bool("shuffle")?,
            random_state: seed,
        })
    }

    fn tree_params(&self, seed: u64) -> Result<TreeParams, ShellError> {
        let criterion = match self.value("criterion")? {
            ParamValue::Text(t) => Criterion::parse(t)
                .filter(|c| *c != Criterion::SquaredError)
                .ok_or_else(|| self.invalid("criterion", "gini or entropy"))?,
            _ => return Err(self.invalid("criterion", "gini or entropy")),
        };
        let max_depth = self.optional_usize("max_depth")?;
        let max_features = match self.value("max_features")? {
            ParamValue::Text(t) if t == "none" => MaxFeatures::All,
            ParamValue::Text(t) if t == "sqrt" || t == "auto" => MaxFeatures::Sqrt,
            other => MaxFeatures::Fixed(
                other
                    .as_usize()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| self.invalid("max_features", "sqrt, none or a positive integer"))?,
            ),
        };
        Ok(TreeParams {
            max_depth,
            min_samples_split: self.usize("min_samples_split")?,
            min_samples_leaf: self.usize("min_samples_leaf")?,
            max_features,
            criterion,
            seed,
        })
    }

    fn value(&self, key: &str) -> Result<&ParamValue, ShellError> {
        self.params
            .get(key)
            .ok_or_else(|| ShellError::Model(format!("Missing hyperparameter {}", key)))
    }

    fn invalid(&self, key: &str, expected: &str) -> ShellError {
        let got = self
            .params
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_default();
        ShellError::Model(format!(
            "Hyperparameter {} for {} expects {}, got {}",
            key,
            self.kind.command(),
            expected,
            got
        ))
    }

    fn bool(&self, key: &str) -> Result<bool, ShellError> {
        self.value(key)?
            .as_bool()
            .ok_or_else(|| self.invalid(key, "true or false"))
    }

    fn usize(&self, key: &str) -> Result<usize, ShellError> {
        self.value(key)?
            .as_usize()
            .ok_or_else(|| self.invalid(key, "a non-negative integer"))
    }

    fn optional_usize(&self, key: &str) -> Result<Option<usize>, ShellError> {
        let value = self.value(key)?;
        if value.is_none() {
            return Ok(None);
        }
        value
            .as_usize()
            .map(Some)
            .ok_or_else(|| self.invalid(key, "none or a non-negative integer"))
    }

    fn non_negative(&self, key: &str) -> Result<f64, ShellError> {
        self.value(key)?
            .as_f64()
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| self.invalid(key, "a non-negative number"))
    }

    fn positive(&self, key: &str) -> Result<f64, ShellError> {
        self.value(key)?
            .as_f64()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| self.invalid(key, "a positive number"))
    }
}
