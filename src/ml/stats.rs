//! Score confidence intervals and the distribution quantiles they need.

use crate::error::ShellError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Significance level used for every reported interval.
pub const ALPHA: f64 = 0.05;

/// A score with its `(1 - alpha)` confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInterval {
    pub score: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ScoreInterval {
    /// `CI: [lo, hi] <==> score +- half`
    pub fn note(&self) -> String {
        format!(
            "CI: [{:.4}, {:.4}] <==> {:.4} +- {:.4}",
            self.lower,
            self.upper,
            self.score,
            self.upper - self.score
        )
    }
}

/// Accuracy with a normal-approximation interval.
pub fn accuracy_interval(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    alpha: f64,
) -> Result<ScoreInterval, ShellError> {
    let n = y_true.len();
    if n == 0 || y_pred.len() != n {
        return Err(ShellError::Model(
            "Accuracy needs non-empty predictions matching the target".to_string(),
        ));
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    let accuracy = correct as f64 / n as f64;
    let z = norm_ppf(1.0 - alpha / 2.0);
    let se = (accuracy * (1.0 - accuracy) / n as f64).sqrt();
    Ok(ScoreInterval {
        score: accuracy,
        lower: accuracy - z * se,
        upper: accuracy + z * se,
    })
}

/// Residual variance `SSE / (n - p)` with a chi-square interval on `n - p` degrees of freedom.
pub fn mse_interval(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    n_parameters: usize,
    alpha: f64,
) -> Result<ScoreInterval, ShellError> {
    let n = y_true.len();
    if y_pred.len() != n {
        return Err(ShellError::Model(
            "Predictions do not match the target length".to_string(),
        ));
    }
    if n <= n_parameters {
        return Err(ShellError::Model(
            "Degrees of freedom (n - p) must be > 0.".to_string(),
        ));
    }
    let dof = (n - n_parameters) as f64;
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let mse = sse / dof;
    let chi_hi = chi2_ppf(1.0 - alpha / 2.0, dof);
    let chi_lo = chi2_ppf(alpha / 2.0, dof);
    Ok(ScoreInterval {
        score: mse,
        lower: dof * mse / chi_hi,
        upper: dof * mse / chi_lo,
    })
}

/// Inverse standard normal CDF (Acklam's rational approximation, relative error < 1.15e-9).
pub fn norm_ppf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Natural log of the gamma function (Lanczos, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = COEF[0];
    let t = x + 7.5;
    for (i, c) in COEF.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized lower incomplete gamma `P(a, x)`.
pub fn regularized_gamma_p(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let gln = ln_gamma(a);
    if x < a + 1.0 {
        let mut ap = a;
        let mut sum = 1.0 / a;
        let mut del = sum;
        for _ in 0..1000 {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del.abs() < sum.abs() * 1e-15 {
                break;
            }
        }
        (sum.ln() - x + a * x.ln() - gln).exp()
    } else {
        // Lentz continued fraction for Q(a, x)
        let tiny = 1e-300;
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / tiny;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..1000 {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < tiny {
                d = tiny;
            }
            c = b + an / c;
            if c.abs() < tiny {
                c = tiny;
            }
            d = 1.0 / d;
            let del = d * c;
            h *= del;
            if (del - 1.0).abs() < 1e-15 {
                break;
            }
        }
        1.0 - (-x + a * x.ln() - gln).exp() * h
    }
}

pub fn chi2_cdf(x: f64, dof: f64) -> f64 {
    regularized_gamma_p(dof / 2.0, x / 2.0)
}

/// Chi-square quantile by bisection on the CDF.
pub fn chi2_ppf(p: f64, dof: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    let mut lo = 0.0;
    let mut hi = dof.max(1.0);
    while chi2_cdf(hi, dof) < p {
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if chi2_cdf(mid, dof) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 * hi.max(1.0) {
            break;
        }
    }
    0.5 * (lo + hi)
}
