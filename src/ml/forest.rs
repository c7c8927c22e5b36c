//! Random forest classifier: bootstrapped CART trees voting by averaged class probabilities.

use crate::error::ShellError;
use crate::ml::estimator::{argmax_rows, check_fit_input, check_predict_input, Estimator};
use crate::ml::tree::{Criterion, DecisionTree, MaxFeatures, TreeParams};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub criterion: Criterion,
    pub random_state: u64,
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: 42,
            n_classes,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        check_predict_input(x, self.n_features)?;
        if self.trees.is_empty() {
            return Err(ShellError::Model("Forest has not been fitted".to_string()));
        }
        let mut total = Array2::zeros((x.nrows(), self.n_classes));
        for tree in &self.trees {
            total = total + tree.predict_proba(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Estimator for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(ShellError::Model("n_estimators must be >= 1".to_string()));
        }
        let n_samples = x.nrows();
        let base = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            criterion: self.criterion,
            seed: 0,
        };

        let trees: Result<Vec<DecisionTree>, ShellError> = (0..self.n_estimators)
            .into_par_iter()
            .map(|index| {
                let seed = self.random_state.wrapping_add(index as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let rows: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let mut tree = DecisionTree::classifier(
                    self.n_classes,
                    TreeParams {
                        seed: rng.gen(),
                        ..base.clone()
                    },
                );
                tree.fit_rows(x, y, rows)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.trees.is_empty() {
            return None;
        }
        let mut sum = Array1::zeros(self.n_features);
        for tree in &self.trees {
            sum = sum + tree.importances();
        }
        let total = sum.sum();
        Some(if total > 0.0 { sum / total } else { sum })
    }
}
