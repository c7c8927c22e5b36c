//! Principal component analysis on standardized features.

use crate::error::ShellError;
use crate::ml::estimator::StandardScaler;
use crate::ml::linalg::symmetric_eigen;
use ndarray::{s, Array1, Array2};

/// A fitted decomposition. `components` holds one principal axis per row.
#[derive(Debug, Clone)]
pub struct PcaModel {
    pub feature_names: Vec<String>,
    pub components: Array2<f64>,
    pub explained_variance: Array1<f64>,
    pub explained_variance_ratio: Array1<f64>,
    scaler: StandardScaler,
}

impl PcaModel {
    /// Fit every component of the standardized data.
    pub fn fit(x: &Array2<f64>, feature_names: Vec<String>) -> Result<Self, ShellError> {
        if x.nrows() < 2 {
            return Err(ShellError::Model(
                "PCA needs at least 2 samples".to_string(),
            ));
        }
        if x.ncols() == 0 {
            return Err(ShellError::Model("PCA needs at least 1 feature".to_string()));
        }
        let scaler = StandardScaler::fit(x);
        let scaled = scaler.transform(x);
        let covariance = scaled.t().dot(&scaled) / (x.nrows() as f64 - 1.0);
        let (values, vectors) = symmetric_eigen(&covariance);

        let explained_variance = values.mapv(|v| v.max(0.0));
        let total = explained_variance.sum();
        let explained_variance_ratio = if total > 0.0 {
            &explained_variance / total
        } else {
            Array1::zeros(explained_variance.len())
        };

        // Sign convention: the largest-magnitude loading of each axis is positive.
        let mut components = vectors.reversed_axes();
        for mut row in components.rows_mut() {
            let pivot = row
                .iter()
                .cloned()
                .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
            if pivot < 0.0 {
                row.mapv_inplace(|v| -v);
            }
        }

        Ok(Self {
            feature_names,
            components,
            explained_variance,
            explained_variance_ratio,
            scaler,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Project samples onto the first `k` components.
    pub fn transform(&self, x: &Array2<f64>, k: usize) -> Array2<f64> {
        let k = k.min(self.n_components());
        let scaled = self.scaler.transform(x);
        scaled.dot(&self.components.slice(s![..k, ..]).t())
    }

    pub fn cumulative_ratio(&self) -> Vec<f64> {
        self.explained_variance_ratio
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect()
    }
}
