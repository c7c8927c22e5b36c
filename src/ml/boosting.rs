//! Gradient boosted trees for classification with a multinomial deviance loss.

use crate::error::ShellError;
use crate::ml::estimator::{argmax_rows, check_fit_input, check_predict_input, Estimator};
use crate::ml::linear::{one_hot, softmax};
use crate::ml::tree::{DecisionTree, TreeParams};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GradientBoostingClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub random_state: u64,
    n_classes: usize,
    n_features: usize,
    initial: Array1<f64>,
    /// One regression tree per class per boosting round
    stages: Vec<Vec<DecisionTree>>,
}

impl GradientBoostingClassifier {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: 42,
            n_classes: n_classes.max(2),
            n_features: 0,
            initial: Array1::zeros(0),
            stages: Vec::new(),
        }
    }

    fn raw_scores(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        check_predict_input(x, self.n_features)?;
        let mut scores = Array2::zeros((x.nrows(), self.n_classes));
        for mut row in scores.rows_mut() {
            row.assign(&self.initial);
        }
        for stage in &self.stages {
            for (k, tree) in stage.iter().enumerate() {
                let update = tree.predict_values(x)?;
                let mut column = scores.column_mut(k);
                column.scaled_add(self.learning_rate, &update);
            }
        }
        Ok(scores)
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        Ok(softmax(&self.raw_scores(x)?))
    }
}

impl Estimator for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        if self.learning_rate <= 0.0 {
            return Err(ShellError::Model("learning_rate must be positive".to_string()));
        }
        let n = x.nrows();
        let k = self.n_classes;
        let targets = one_hot(y, k);

        // Start from log class priors, floored so absent classes stay finite.
        let counts = targets.sum_axis(ndarray::Axis(0));
        self.initial = counts.mapv(|c| (c.max(1e-3) / n as f64).ln());
        self.n_features = x.ncols();
        self.stages.clear();

        let mut scores = Array2::zeros((n, k));
        for mut row in scores.rows_mut() {
            row.assign(&self.initial);
        }

        let params = TreeParams {
            max_depth: Some(self.max_depth),
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            seed: self.random_state,
            ..TreeParams::default()
        };
        let shrink = (k as f64 - 1.0) / k as f64;

        for _ in 0..self.n_estimators {
            let probs = softmax(&scores);
            let mut stage = Vec::with_capacity(k);
            for class in 0..k {
                let residual = &targets.column(class) - &probs.column(class);
                let mut tree = DecisionTree::regressor(params.clone());
                tree.fit(x, &residual)?;

                // Newton step per leaf: sum(r) / sum(|r| (1 - |r|)).
                let mut sums: HashMap<usize, (f64, f64)> = HashMap::new();
                let leaves: Vec<usize> = x.rows().into_iter().map(|row| tree.apply(row)).collect();
                for (i, &leaf) in leaves.iter().enumerate() {
                    let r = residual[i];
                    let entry = sums.entry(leaf).or_insert((0.0, 0.0));
                    entry.0 += r;
                    entry.1 += r.abs() * (1.0 - r.abs());
                }
                for (&leaf, &(numerator, denominator)) in &sums {
                    let output = if denominator.abs() < 1e-150 {
                        0.0
                    } else {
                        shrink * numerator / denominator
                    };
                    tree.set_leaf_output(leaf, output);
                }

                for (i, &leaf) in leaves.iter().enumerate() {
                    let (numerator, denominator) = sums.get(&leaf).copied().unwrap_or((0.0, 1.0));
                    if denominator.abs() >= 1e-150 {
                        scores[[i, class]] += self.learning_rate * shrink * numerator / denominator;
                    }
                }
                stage.push(tree);
            }
            self.stages.push(stage);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        Ok(argmax_rows(&self.raw_scores(x)?))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.stages.is_empty() {
            return None;
        }
        let mut sum = Array1::zeros(self.n_features);
        for tree in self.stages.iter().flatten() {
            sum = sum + tree.importances();
        }
        let total = sum.sum();
        Some(if total > 0.0 { sum / total } else { sum })
    }
}
