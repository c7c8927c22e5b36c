//! Gaussian naive Bayes.

use crate::error::ShellError;
use crate::ml::estimator::{check_fit_input, check_predict_input, Estimator};
use ndarray::{Array1, Array2, Axis};

#[derive(Debug, Clone)]
pub struct GaussianNaiveBayes {
    /// Fraction of the largest feature variance added to every variance
    pub var_smoothing: f64,
    n_classes: usize,
    means: Array2<f64>,
    variances: Array2<f64>,
    log_priors: Array1<f64>,
}

impl GaussianNaiveBayes {
    pub fn new(n_classes: usize) -> Self {
        Self {
            var_smoothing: 1e-9,
            n_classes,
            means: Array2::zeros((n_classes, 0)),
            variances: Array2::zeros((n_classes, 0)),
            log_priors: Array1::zeros(n_classes),
        }
    }

    pub fn priors(&self) -> Array1<f64> {
        self.log_priors.mapv(f64::exp)
    }

    fn joint_log_likelihood(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::from_elem((x.nrows(), self.n_classes), f64::NEG_INFINITY);
        for (i, sample) in x.rows().into_iter().enumerate() {
            for class in 0..self.n_classes {
                if !self.log_priors[class].is_finite() {
                    continue;
                }
                let mean = self.means.row(class);
                let var = self.variances.row(class);
                let log_likelihood: f64 = sample
                    .iter()
                    .zip(mean.iter().zip(var.iter()))
                    .map(|(&v, (&m, &s2))| {
                        -0.5 * (2.0 * std::f64::consts::PI * s2).ln() - (v - m).powi(2) / (2.0 * s2)
                    })
                    .sum();
                out[[i, class]] = self.log_priors[class] + log_likelihood;
            }
        }
        out
    }
}

impl Estimator for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        let n_features = x.ncols();
        let epsilon = self.var_smoothing
            * x.var_axis(Axis(0), 0.0)
                .iter()
                .cloned()
                .fold(0.0, f64::max);

        let mut means = Array2::zeros((self.n_classes, n_features));
        let mut variances = Array2::from_elem((self.n_classes, n_features), 1.0);
        let mut log_priors = Array1::from_elem(self.n_classes, f64::NEG_INFINITY);

        for class in 0..self.n_classes {
            let rows: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, &label)| label.round() as usize == class)
                .map(|(i, _)| i)
                .collect();
            if rows.is_empty() {
                continue;
            }
            let members = x.select(Axis(0), &rows);
            let mean = members
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(n_features));
            let var = members.var_axis(Axis(0), 0.0) + epsilon;
            means.row_mut(class).assign(&mean);
            variances
                .row_mut(class)
                .assign(&var.mapv(|v| if v > 0.0 { v } else { 1e-12 }));
            log_priors[class] = (rows.len() as f64 / x.nrows() as f64).ln();
        }

        self.means = means;
        self.variances = variances;
        self.log_priors = log_priors;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        check_predict_input(x, self.means.ncols())?;
        Ok(crate::ml::estimator::argmax_rows(&self.joint_log_likelihood(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_gaussian_blobs() {
        let x = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [5.0, 5.1], [5.2, 4.9], [4.9, 5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut model = GaussianNaiveBayes::new(2);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&array![[0.1, 0.0], [5.0, 5.0]]).unwrap().to_vec(), vec![0.0, 1.0]);
        assert!(model.priors().iter().all(|p| (p - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_absent_class_is_never_predicted() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 0.0];
        let mut model = GaussianNaiveBayes::new(3);
        model.fit(&x, &y).unwrap();
        assert!(model.predict(&x).unwrap().iter().all(|&p| p == 0.0));
    }
}
