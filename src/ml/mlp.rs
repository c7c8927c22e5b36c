//! Multi-layer perceptrons with ReLU hidden layers trained by mini-batch Adam.

use crate::error::ShellError;
use crate::ml::estimator::{argmax_rows, check_fit_input, check_predict_input, Estimator};
use crate::ml::linear::{one_hot, softmax};
use ndarray::{Array, Array1, Array2, Axis, Dimension, Zip};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BETA_1: f64 = 0.9;
const BETA_2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub struct MlpParams {
    pub hidden_layer_sizes: Vec<usize>,
    /// L2 penalty
    pub alpha: f64,
    pub learning_rate_init: f64,
    /// Maximum number of epochs
    pub max_iter: usize,
    /// Mini-batch size; `min(200, n_samples)` when `None`
    pub batch_size: Option<usize>,
    pub tol: f64,
    /// Epochs without a `tol` improvement before stopping
    pub n_iter_no_change: usize,
    pub shuffle: bool,
    pub random_state: u64,
}

impl Default for MlpParams {
    fn default() -> Self {
        Self {
            hidden_layer_sizes: vec![100],
            alpha: 1e-4,
            learning_rate_init: 1e-3,
            max_iter: 200,
            batch_size: None,
            tol: 1e-4,
            n_iter_no_change: 10,
            shuffle: true,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputActivation {
    Identity,
    Softmax,
}

#[derive(Debug, Clone)]
struct Network {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    output: OutputActivation,
}

impl Network {
    fn initialize(sizes: &[usize], output: OutputActivation, rng: &mut ChaCha8Rng) -> Self {
        let mut weights = Vec::with_capacity(sizes.len() - 1);
        let mut biases = Vec::with_capacity(sizes.len() - 1);
        for pair in sizes.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let bound = (6.0 / (fan_in + fan_out) as f64).sqrt();
            weights.push(Array2::from_shape_fn((fan_in, fan_out), |_| {
                rng.gen_range(-bound..bound)
            }));
            biases.push(Array1::from_shape_fn(fan_out, |_| rng.gen_range(-bound..bound)));
        }
        Self {
            weights,
            biases,
            output,
        }
    }

    /// Activations of every layer, input first.
    fn forward(&self, x: &Array2<f64>) -> Vec<Array2<f64>> {
        let mut activations = vec![x.to_owned()];
        let last = self.weights.len() - 1;
        for (layer, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            let z = activations[layer].dot(w) + b;
            let a = if layer < last {
                z.mapv(|v| v.max(0.0))
            } else {
                match self.output {
                    OutputActivation::Identity => z,
                    OutputActivation::Softmax => softmax(&z),
                }
            };
            activations.push(a);
        }
        activations
    }

    fn predict(&self, x: &Array2<f64>) -> Array2<f64> {
        self.forward(x).pop().unwrap_or_else(|| Array2::zeros((x.nrows(), 0)))
    }

    fn loss(&self, out: &Array2<f64>, targets: &Array2<f64>) -> f64 {
        let n = out.nrows().max(1) as f64;
        match self.output {
            OutputActivation::Identity => {
                0.5 * (out - targets).mapv(|d| d * d).sum() / n
            }
            OutputActivation::Softmax => {
                -Zip::from(out)
                    .and(targets)
                    .fold(0.0, |acc, &p, &t| acc + t * p.max(1e-12).ln())
                    / n
            }
        }
    }

    fn train(
        params: &MlpParams,
        x: &Array2<f64>,
        targets: &Array2<f64>,
        output: OutputActivation,
    ) -> Result<Network, ShellError> {
        if params.hidden_layer_sizes.iter().any(|&size| size == 0) {
            return Err(ShellError::Model(
                "hidden_layer_sizes must be positive".to_string(),
            ));
        }
        if params.learning_rate_init <= 0.0 {
            return Err(ShellError::Model(
                "learning_rate_init must be positive".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(params.random_state);
        let mut sizes = vec![x.ncols()];
        sizes.extend(&params.hidden_layer_sizes);
        sizes.push(targets.ncols());
        let mut network = Network::initialize(&sizes, output, &mut rng);

        let mut m_w: Vec<Array2<f64>> = network.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect();
        let mut v_w = m_w.clone();
        let mut m_b: Vec<Array1<f64>> = network.biases.iter().map(|b| Array1::zeros(b.raw_dim())).collect();
        let mut v_b = m_b.clone();

        let n = x.nrows();
        let batch_size = params.batch_size.unwrap_or(200).clamp(1, n);
        let mut order: Vec<usize> = (0..n).collect();
        let mut best_loss = f64::INFINITY;
        let mut stale_epochs = 0;
        let mut step = 0i32;

        for epoch in 0..params.max_iter {
            if params.shuffle {
                order.shuffle(&mut rng);
            }
            let mut epoch_loss = 0.0;
            for batch in order.chunks(batch_size) {
                let xb = x.select(Axis(0), batch);
                let tb = targets.select(Axis(0), batch);
                let m = batch.len() as f64;

                let activations = network.forward(&xb);
                let out = &activations[activations.len() - 1];
                let penalty: f64 = network.weights.iter().map(|w| w.mapv(|v| v * v).sum()).sum();
                epoch_loss += (network.loss(out, &tb) + 0.5 * params.alpha * penalty / m) * m;

                let mut delta = (out - &tb) / m;
                let mut grads_w = Vec::with_capacity(network.weights.len());
                let mut grads_b = Vec::with_capacity(network.weights.len());
                for layer in (0..network.weights.len()).rev() {
                    let grad_w = activations[layer].t().dot(&delta)
                        + &(&network.weights[layer] * (params.alpha / m));
                    let grad_b = delta.sum_axis(Axis(0));
                    if layer > 0 {
                        let mut back = delta.dot(&network.weights[layer].t());
                        Zip::from(&mut back)
                            .and(&activations[layer])
                            .for_each(|d, &a| {
                                if a <= 0.0 {
                                    *d = 0.0;
                                }
                            });
                        delta = back;
                    }
                    grads_w.push(grad_w);
                    grads_b.push(grad_b);
                }
                grads_w.reverse();
                grads_b.reverse();

                step += 1;
                let lr = params.learning_rate_init * (1.0 - BETA_2.powi(step)).sqrt()
                    / (1.0 - BETA_1.powi(step));
                for layer in 0..network.weights.len() {
                    adam_update(&mut network.weights[layer], &grads_w[layer], &mut m_w[layer], &mut v_w[layer], lr);
                    adam_update(&mut network.biases[layer], &grads_b[layer], &mut m_b[layer], &mut v_b[layer], lr);
                }
            }
            epoch_loss /= n as f64;
            if !epoch_loss.is_finite() {
                return Err(ShellError::Model(format!(
                    "Training diverged at epoch {}",
                    epoch + 1
                )));
            }

            if epoch_loss > best_loss - params.tol {
                stale_epochs += 1;
            } else {
                stale_epochs = 0;
            }
            best_loss = best_loss.min(epoch_loss);
            if stale_epochs >= params.n_iter_no_change {
                tracing::debug!(epoch = epoch + 1, loss = epoch_loss, "MLP training converged");
                break;
            }
        }
        Ok(network)
    }
}

fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    lr: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA_1 * *m + (1.0 - BETA_1) * g;
            *v = BETA_2 * *v + (1.0 - BETA_2) * g * g;
            *p -= lr * *m / (v.sqrt() + EPSILON);
        });
}

#[derive(Debug, Clone)]
pub struct MlpRegressor {
    pub params: MlpParams,
    n_features: usize,
    network: Option<Network>,
}

impl MlpRegressor {
    pub fn new(params: MlpParams) -> Self {
        Self {
            params,
            n_features: 0,
            network: None,
        }
    }
}

impl Estimator for MlpRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        let targets = y.to_owned().insert_axis(Axis(1));
        self.network = Some(Network::train(&self.params, x, &targets, OutputActivation::Identity)?);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ShellError::Model("MLP has not been fitted".to_string()))?;
        check_predict_input(x, self.n_features)?;
        Ok(network.predict(x).column(0).to_owned())
    }
}

#[derive(Debug, Clone)]
pub struct MlpClassifier {
    pub params: MlpParams,
    n_classes: usize,
    n_features: usize,
    network: Option<Network>,
}

impl MlpClassifier {
    pub fn new(n_classes: usize, params: MlpParams) -> Self {
        Self {
            params,
            n_classes: n_classes.max(2),
            n_features: 0,
            network: None,
        }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ShellError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ShellError::Model("MLP has not been fitted".to_string()))?;
        check_predict_input(x, self.n_features)?;
        Ok(network.predict(x))
    }
}

impl Estimator for MlpClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ShellError> {
        check_fit_input(x, y)?;
        let targets = one_hot(y, self.n_classes);
        self.network = Some(Network::train(&self.params, x, &targets, OutputActivation::Softmax)?);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ShellError> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }
}
