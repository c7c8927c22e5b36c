//! The estimator trait shared by every model, plus feature standardization.

use crate::error::ShellError;
use ndarray::{Array1, Array2, Axis};

/// A supervised model over dense `f64` features.
///
/// Classifiers take class indices in `y` and predict class indices.
pub trait Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError>;

    /// Fitted parameters counted against residual degrees of freedom.
    fn n_parameters(&self) -> usize {
        0
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Reject inputs that cannot be fitted.
pub fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
    if x.nrows() == 0 {
        return Err(ShellError::Model("Cannot fit on zero samples".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(ShellError::Model(format!(
            "X has {} rows but y has {} values",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ShellError::Model("Input contains non-finite values".to_string()));
    }
    Ok(())
}

pub fn check_predict_input(x: &Array2<f64>, n_features: usize) -> Result<(), ShellError> {
    if x.ncols() != n_features {
        return Err(ShellError::Model(format!(
            "Model was fitted on {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    Ok(())
}

/// Column-wise standardization with population statistics; constant columns keep scale 1.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Self {
        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.scale
    }

    pub fn fit_transform(x: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(x);
        let scaled = scaler.transform(x);
        (scaler, scaled)
    }
}

/// Index of the largest value in each row.
pub fn argmax_rows(scores: &Array2<f64>) -> Array1<f64> {
    scores
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0usize, f64::NEG_INFINITY), |best, (i, &v)| {
                    if v > best.1 {
                        (i, v)
                    } else {
                        best
                    }
                })
                .0 as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scaler_centers_and_scales() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&x);
        assert_eq!(scaled, array![[-1.0, 0.0], [1.0, 0.0]]);
        assert_eq!(scaler.transform(&array![[2.0, 6.0]]), array![[0.0, 1.0]]);
    }

    #[test]
    fn test_argmax_rows() {
        let scores = array![[0.1, 0.7, 0.2], [0.5, 0.2, 0.3]];
        assert_eq!(argmax_rows(&scores).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_check_fit_input_rejects_mismatch() {
        assert!(check_fit_input(&array![[1.0], [2.0]], &array![1.0]).is_err());
        assert!(check_fit_input(&array![[f64::NAN]], &array![1.0]).is_err());
    }
}
