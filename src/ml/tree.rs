//! CART decision trees for classification (gini/entropy) and regression (squared error).

use crate::error::ShellError;
use crate::ml::estimator::{argmax_rows, check_fit_input, check_predict_input, Estimator};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Gini,
    Entropy,
    SquaredError,
}

impl Criterion {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "gini" => Some(Criterion::Gini),
            "entropy" | "log_loss" => Some(Criterion::Entropy),
            "squared_error" | "mse" => Some(Criterion::SquaredError),
            _ => None,
        }
    }
}

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(n) => *n,
        }
        .clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub criterion: Criterion,
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            criterion: Criterion::Gini,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    /// Class distribution for classifiers, `[mean]` for regressors
    Leaf { value: Vec<f64> },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub params: TreeParams,
    /// Zero for regression trees
    n_classes: usize,
    n_features: usize,
    nodes: Vec<Node>,
    importances: Array1<f64>,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    left_impurity: f64,
    right_impurity: f64,
}

impl DecisionTree {
    pub fn classifier(n_classes: usize, params: TreeParams) -> Self {
        Self {
            params,
            n_classes: n_classes.max(1),
            n_features: 0,
            nodes: Vec::new(),
            importances: Array1::zeros(0),
        }
    }

    pub fn regressor(mut params: TreeParams) -> Self {
        params.criterion = Criterion::SquaredError;
        Self {
            params,
            n_classes: 0,
            n_features: 0,
            nodes: Vec::new(),
            importances: Array1::zeros(0),
        }
    }

    fn is_classifier(&self) -> bool {
        self.n_classes > 0
    }

    /// Fit on a subset of rows (repeats allowed, as in a bootstrap sample).
    pub fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
    ) -> Result<(), ShellError> {
        if rows.is_empty() {
            return Err(ShellError::Model("Cannot fit a tree on zero samples".to_string()));
        }
        if self.params.min_samples_leaf == 0 || self.params.min_samples_split < 2 {
            return Err(ShellError::Model(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }
        self.n_features = x.ncols();
        self.nodes.clear();
        let mut importances = vec![0.0; x.ncols()];
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        self.build(x, y, rows, 0, &mut rng, &mut importances);

        let total: f64 = importances.iter().sum();
        self.importances = if total > 0.0 {
            Array1::from_iter(importances.iter().map(|v| v / total))
        } else {
            Array1::zeros(x.ncols())
        };
        Ok(())
    }

    fn build(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
        importances: &mut [f64],
    ) -> usize {
        let impurity = self.impurity(y, &rows);
        let depth_left = self.params.max_depth.map_or(true, |max| depth < max);
        let splittable = depth_left
            && rows.len() >= self.params.min_samples_split
            && rows.len() >= 2 * self.params.min_samples_leaf
            && impurity > 1e-12;

        let choice = if splittable {
            self.best_split(x, y, &rows, impurity, rng)
        } else {
            None
        };

        let Some(choice) = choice else {
            let value = self.leaf_value(y, &rows);
            self.nodes.push(Node::Leaf { value });
            return self.nodes.len() - 1;
        };

        let n = rows.len() as f64;
        importances[choice.feature] += n * impurity
            - choice.left.len() as f64 * choice.left_impurity
            - choice.right.len() as f64 * choice.right_impurity;

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: Vec::new() });
        let left = self.build(x, y, choice.left, depth + 1, rng, importances);
        let right = self.build(x, y, choice.right, depth + 1, rng, importances);
        self.nodes[index] = Node::Split {
            feature: choice.feature,
            threshold: choice.threshold,
            left,
            right,
        };
        index
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitChoice> {
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        let k = self.params.max_features.resolve(x.ncols());
        if k < features.len() {
            features.shuffle(rng);
            features.truncate(k);
        }

        let min_leaf = self.params.min_samples_leaf;
        let n = rows.len();
        let mut best: Option<(f64, usize, f64)> = None;

        for &feature in &features {
            let mut sorted = rows.to_vec();
            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left = self.accumulator();
            let mut right = self.accumulator();
            for &row in &sorted {
                right.add(y[row]);
            }

            for i in 0..n - 1 {
                left.add(y[sorted[i]]);
                right.remove(y[sorted[i]]);
                let here = x[[sorted[i], feature]];
                let next = x[[sorted[i + 1], feature]];
                if next <= here || i + 1 < min_leaf || n - i - 1 < min_leaf {
                    continue;
                }
                let weighted = ((i + 1) as f64 * left.impurity(self.params.criterion)
                    + (n - i - 1) as f64 * right.impurity(self.params.criterion))
                    / n as f64;
                if best.map_or(true, |(score, _, _)| weighted < score - 1e-15) {
                    best = Some((weighted, feature, 0.5 * (here + next)));
                }
            }
        }

        let (score, feature, threshold) = best?;
        if score > parent_impurity + 1e-12 {
            return None;
        }
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.iter().copied().partition(|&row| x[[row, feature]] <= threshold);
        Some(SplitChoice {
            feature,
            threshold,
            left_impurity: self.impurity(y, &left),
            right_impurity: self.impurity(y, &right),
            left,
            right,
        })
    }

    fn accumulator(&self) -> Accumulator {
        if self.is_classifier() {
            Accumulator::Counts {
                counts: vec![0.0; self.n_classes],
                n: 0.0,
            }
        } else {
            Accumulator::Moments {
                sum: 0.0,
                sum_sq: 0.0,
                n: 0.0,
            }
        }
    }

    fn impurity(&self, y: &Array1<f64>, rows: &[usize]) -> f64 {
        let mut acc = self.accumulator();
        for &row in rows {
            acc.add(y[row]);
        }
        acc.impurity(self.params.criterion)
    }

    fn leaf_value(&self, y: &Array1<f64>, rows: &[usize]) -> Vec<f64> {
        if self.is_classifier() {
            let mut dist = vec![0.0; self.n_classes];
            for &row in rows {
                let class = y[row].round() as usize;
                if class < self.n_classes {
                    dist[class] += 1.0;
                }
            }
            let total: f64 = dist.iter().sum();
            if total > 0.0 {
                dist.iter_mut().for_each(|d| *d /= total);
            }
            dist
        } else {
            let mean = rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len().max(1) as f64;
            vec![mean]
        }
    }

    /// Index of the leaf a sample falls into.
    pub fn apply(&self, sample: ArrayView1<f64>) -> usize {
        let mut index = 0;
        while let Some(Node::Split {
            feature,
            threshold,
            left,
            right,
        }) = self.nodes.get(index)
        {
            index = if sample[*feature] <= *threshold {
                *left
            } else {
                *right
            };
        }
        index
    }

    /// Overwrite a regression leaf's output (used by gradient boosting's Newton step).
    pub fn set_leaf_output(&mut self, leaf: usize, output: f64) {
        if let Some(Node::Leaf { value }) = self.nodes.get_mut(leaf) {
            *value = vec![output];
        }
    }

    fn leaf(&self, sample: ArrayView1<f64>) -> &[f64] {
        match self.nodes.get(self.apply(sample)) {
            Some(Node::Leaf { value }) => value,
            _ => &[],
        }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        check_predict_input(x, self.n_features)?;
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (i, sample) in x.rows().into_iter().enumerate() {
            for (k, p) in self.leaf(sample).iter().enumerate() {
                out[[i, k]] = *p;
            }
        }
        Ok(out)
    }

    pub fn predict_values(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        check_predict_input(x, self.n_features)?;
        Ok(x.rows()
            .into_iter()
            .map(|sample| self.leaf(sample).first().copied().unwrap_or(0.0))
            .collect())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn importances(&self) -> &Array1<f64> {
        &self.importances
    }
}

impl Estimator for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        self.fit_rows(x, y, (0..x.nrows()).collect())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        if self.is_classifier() {
            Ok(argmax_rows(&self.predict_proba(x)?))
        } else {
            self.predict_values(x)
        }
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        Some(self.importances.clone())
    }
}

/// Running statistics for the left or right side of a candidate split.
enum Accumulator {
    Counts { counts: Vec<f64>, n: f64 },
    Moments { sum: f64, sum_sq: f64, n: f64 },
}

impl Accumulator {
    fn add(&mut self, label: f64) {
        match self {
            Accumulator::Counts { counts, n } => {
                if let Some(c) = counts.get_mut(label.round() as usize) {
                    *c += 1.0;
                }
                *n += 1.0;
            }
            Accumulator::Moments { sum, sum_sq, n } => {
                *sum += label;
                *sum_sq += label * label;
                *n += 1.0;
            }
        }
    }

    fn remove(&mut self, label: f64) {
        match self {
            Accumulator::Counts { counts, n } => {
                if let Some(c) = counts.get_mut(label.round() as usize) {
                    *c -= 1.0;
                }
                *n -= 1.0;
            }
            Accumulator::Moments { sum, sum_sq, n } => {
                *sum -= label;
                *sum_sq -= label * label;
                *n -= 1.0;
            }
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        match self {
            Accumulator::Counts { counts, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                match criterion {
                    Criterion::Entropy => -counts
                        .iter()
                        .filter(|&&c| c > 0.0)
                        .map(|&c| {
                            let p = c / n;
                            p * p.log2()
                        })
                        .sum::<f64>(),
                    _ => 1.0 - counts.iter().map(|&c| (c / n).powi(2)).sum::<f64>(),
                }
            }
            Accumulator::Moments { sum, sum_sq, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                let mean = sum / n;
                (sum_sq / n - mean * mean).max(0.0)
            }
        }
    }
}
