//! K-fold cross-validation with per-fold standardization.

use crate::error::ShellError;
use crate::ml::estimator::{Estimator, StandardScaler};
use crate::project::kind::ProjectKind;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used when shuffling without an explicit `random_state`.
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// Contiguous k-fold splitter. The first `n % k` folds hold one extra sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub random_state: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, ShellError> {
        if self.n_splits < 2 {
            return Err(ShellError::Model(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }
        if n_samples < self.n_splits {
            return Err(ShellError::Model(format!(
                "Cannot have n_splits={} greater than the number of samples: n_samples={}.",
                self.n_splits, n_samples
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let seed = self.random_state.unwrap_or(DEFAULT_SHUFFLE_SEED);
            indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = if fold < remainder { base + 1 } else { base };
            let test = indices[start..start + size].to_vec();
            let train = indices[..start]
                .iter()
                .chain(indices[start + size..].iter())
                .copied()
                .collect();
            folds.push(Fold { train, test });
            start += size;
        }
        Ok(folds)
    }
}

/// What a cross-validated fit produces.
pub struct CvOutcome {
    /// Out-of-fold predictions in sample order
    pub predictions: Array1<f64>,
    /// Accuracy or mean squared error per fold
    pub fold_scores: Vec<f64>,
    /// Model refitted on the full standardized data
    pub final_model: Box<dyn Estimator>,
}

impl CvOutcome {
    pub fn mean_score(&self) -> f64 {
        mean(&self.fold_scores)
    }
}

/// Build a fresh estimator for every fold and once more for the final fit.
pub fn cross_validate<F>(
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: &KFold,
    task: ProjectKind,
    build: F,
) -> Result<CvOutcome, ShellError>
where
    F: Fn() -> Result<Box<dyn Estimator>, ShellError>,
{
    let mut predictions = Array1::zeros(y.len());
    let mut fold_scores = Vec::with_capacity(folds.n_splits);

    for (index, fold) in folds.split(x.nrows())?.into_iter().enumerate() {
        let x_train = x.select(Axis(0), &fold.train);
        let x_test = x.select(Axis(0), &fold.test);
        let y_train = y.select(Axis(0), &fold.train);
        let y_test = y.select(Axis(0), &fold.test);

        let scaler = StandardScaler::fit(&x_train);
        let mut model = build()?;
        model.fit(&scaler.transform(&x_train), &y_train)?;
        let fold_pred = model.predict(&scaler.transform(&x_test))?;

        let score = fold_score(task, &y_test, &fold_pred);
        tracing::debug!(fold = index, score, "Cross-validation fold scored");
        fold_scores.push(score);
        for (position, &sample) in fold.test.iter().enumerate() {
            predictions[sample] = fold_pred[position];
        }
    }

    let (_, scaled) = StandardScaler::fit_transform(x);
    let mut final_model = build()?;
    final_model.fit(&scaled, y)?;

    Ok(CvOutcome {
        predictions,
        fold_scores,
        final_model,
    })
}

/// Accuracy for classification, mean squared error for regression.
pub fn fold_score(task: ProjectKind, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len().max(1) as f64;
    match task {
        ProjectKind::Classification => {
            y_true
                .iter()
                .zip(y_pred.iter())
                .filter(|(t, p)| (*t - *p).abs() < 0.5)
                .count() as f64
                / n
        }
        ProjectKind::Regression => {
            y_true
                .iter()
                .zip(y_pred.iter())
                .map(|(t, p)| (t - p).powi(2))
                .sum::<f64>()
                / n
        }
    }
}

/// Whether `candidate` beats `incumbent` for this task.
pub fn is_better(task: ProjectKind, candidate: f64, incumbent: f64) -> bool {
    match task {
        ProjectKind::Classification => candidate > incumbent,
        ProjectKind::Regression => candidate < incumbent,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
