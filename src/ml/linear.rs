//! Linear and logistic regression.

use crate::error::ShellError;
use crate::ml::estimator::{argmax_rows, check_fit_input, check_predict_input, Estimator};
use crate::ml::linalg::solve;
use ndarray::{Array1, Array2, Axis};

/// Ridge term keeping the normal equations solvable when one-hot columns are collinear.
const NORMAL_EQUATION_RIDGE: f64 = 1e-8;

/// Ordinary least squares via the normal equations.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    pub fit_intercept: bool,
    coef: Array1<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new(fit_intercept: bool) -> Self {
        Self {
            fit_intercept,
            coef: Array1::zeros(0),
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Estimator for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        let (x_c, y_c, x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(x.ncols()));
            let y_mean = y.mean().unwrap_or(0.0);
            (x - &x_mean, y - y_mean, x_mean, y_mean)
        } else {
            (x.to_owned(), y.to_owned(), Array1::zeros(x.ncols()), 0.0)
        };

        let mut gram = x_c.t().dot(&x_c);
        let ridge = NORMAL_EQUATION_RIDGE * (1.0 + gram.diag().iter().cloned().fold(0.0, f64::max));
        for i in 0..gram.nrows() {
            gram[[i, i]] += ridge;
        }
        let rhs = x_c.t().dot(&y_c);
        self.coef = solve(&gram, &rhs)?;
        self.intercept = y_mean - x_mean.dot(&self.coef);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        check_predict_input(x, self.coef.len())?;
        Ok(x.dot(&self.coef) + self.intercept)
    }

    fn n_parameters(&self) -> usize {
        self.coef.len() + usize::from(self.fit_intercept)
    }
}

/// Multinomial logistic regression with an L2 penalty, fitted by full-batch gradient descent.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
    n_classes: usize,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticRegression {
    pub fn new(n_classes: usize) -> Self {
        Self {
            c: 1.0,
            max_iter: 500,
            tol: 1e-4,
            fit_intercept: true,
            n_classes,
            weights: Array2::zeros((0, n_classes)),
            bias: Array1::zeros(n_classes),
        }
    }

    /// Class probabilities, one row per sample.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        check_predict_input(x, self.weights.nrows())?;
        Ok(softmax(&(x.dot(&self.weights) + &self.bias)))
    }
}

impl Estimator for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        if self.c <= 0.0 {
            return Err(ShellError::Model("C must be positive".to_string()));
        }
        let n = x.nrows() as f64;
        let k = self.n_classes.max(2);
        let targets = one_hot(y, k);
        let lambda = 1.0 / (self.c * n);

        // Step size from a bound on the Lipschitz constant of the softmax loss.
        let trace = x.iter().map(|v| v * v).sum::<f64>() / n + 1.0;
        let step = 1.0 / (0.5 * trace + lambda);

        let mut w = Array2::<f64>::zeros((x.ncols(), k));
        let mut b = Array1::<f64>::zeros(k);
        for _ in 0..self.max_iter {
            let probs = softmax(&(x.dot(&w) + &b));
            let residual = (probs - &targets) / n;
            let grad_w = x.t().dot(&residual) + &(&w * lambda);
            let grad_b = residual.sum_axis(Axis(0));

            w = w - &(&grad_w * step);
            if self.fit_intercept {
                b = b - &(&grad_b * step);
            }

            let largest = grad_w
                .iter()
                .chain(grad_b.iter())
                .fold(0.0f64, |m, g| m.max(g.abs()));
            if largest < self.tol {
                break;
            }
        }

        self.n_classes = k;
        self.weights = w;
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    fn n_parameters(&self) -> usize {
        self.weights.len() + if self.fit_intercept { self.bias.len() } else { 0 }
    }
}

/// Row-wise softmax, shifted for numerical stability.
pub fn softmax(scores: &Array2<f64>) -> Array2<f64> {
    let mut out = scores.clone();
    for mut row in out.rows_mut() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Indicator matrix of class indices.
pub fn one_hot(y: &Array1<f64>, n_classes: usize) -> Array2<f64> {
    let mut out = Array2::zeros((y.len(), n_classes));
    for (i, &label) in y.iter().enumerate() {
        let class = label.round() as usize;
        if class < n_classes {
            out[[i, class]] = 1.0;
        }
    }
    out
}
