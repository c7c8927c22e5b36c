//! Grid search over hyperparameters inferred from each model's defaults.

use crate::data::Design;
use crate::error::ShellError;
use crate::ml::catalog::{defaults, tunables, ModelSpec};
use crate::ml::cross_validation::{cross_validate, is_better, KFold};
use crate::ml::params::{Hyperparams, ParamValue};
use crate::project::kind::ModelKind;
use crate::shell::envelope::Diagnostics;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Integer linspace, truncated toward zero, sorted and deduplicated.
pub fn linspace_int(start: i64, end: i64, n: usize) -> Vec<i64> {
    let mut values: Vec<i64> = linspace(start as f64, end as f64, n)
        .into_iter()
        .map(|v| v as i64)
        .collect();
    values.sort_unstable();
    values.dedup();
    values
}

fn unique_floats(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Candidate values for one hyperparameter, or `None` when it is not searchable.
pub fn infer_values(name: &str, default: &ParamValue, n_values: usize) -> Option<Vec<ParamValue>> {
    if name == "hidden_layer_sizes" {
        return Some(
            linspace_int(100, 500, n_values)
                .into_iter()
                .map(|size| ParamValue::List(vec![size.to_string()]))
                .collect(),
        );
    }
    match default {
        ParamValue::Bool(_) if name == "verbose" => Some(vec![ParamValue::Bool(false)]),
        ParamValue::Bool(_) => Some(vec![ParamValue::Bool(true), ParamValue::Bool(false)]),
        ParamValue::Int(d) if *d > 0 => {
            let values = if n_values == 1 {
                vec![*d]
            } else if name == "random_state" {
                vec![42]
            } else if name == "max_iter" {
                linspace_int((*d).min(500), d * 3, n_values)
            } else {
                linspace_int((d / 2).max(1), d * 2, n_values)
            };
            Some(values.into_iter().map(ParamValue::Int).collect())
        }
        ParamValue::Float(d) if *d > 0.0 && *d < 1.0 => {
            let values = if n_values == 1 || name == "tol" {
                vec![*d]
            } else {
                unique_floats(linspace((d / 2.0).max(1e-9), (d * 2.0).min(1.0), n_values))
            };
            Some(values.into_iter().map(ParamValue::Float).collect())
        }
        _ => None,
    }
}

/// The search grid for a model, in tunable order.
pub fn infer_grid(kind: ModelKind, n_values: usize) -> Vec<(String, Vec<ParamValue>)> {
    let defaults = defaults(kind);
    tunables(kind)
        .iter()
        .filter_map(|name| {
            let default = defaults.get(*name)?;
            infer_values(name, default, n_values).map(|values| (name.to_string(), values))
        })
        .collect()
}

/// Cartesian product of a grid; the first parameter varies slowest.
pub fn candidates(grid: &[(String, Vec<ParamValue>)]) -> Vec<Hyperparams> {
    grid.iter().fold(vec![Hyperparams::new()], |acc, (name, values)| {
        acc.iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.insert(name.clone(), value.clone());
                    next
                })
            })
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TuneResult {
    pub best: Hyperparams,
    /// Mean cross-validated accuracy or MSE of `best`
    pub score: f64,
    pub evaluated: usize,
    pub failed: usize,
}

/// Evaluate every grid candidate by mean fold score and keep the best.
pub fn grid_search(
    kind: ModelKind,
    design: &Design,
    n_values: usize,
    folds: &KFold,
    seed: u64,
) -> Result<TuneResult, ShellError> {
    folds.split(design.n_samples())?;
    let grid = infer_grid(kind, n_values);
    let task = kind.task();
    let mut best: Option<(Hyperparams, f64)> = None;
    let mut last_error = None;
    let mut evaluated = 0;
    let mut failed = 0;

    for candidate in candidates(&grid) {
        let spec = ModelSpec::new(kind, &candidate, &mut Diagnostics::new());
        let outcome = cross_validate(&design.x, &design.y, folds, task, || {
            spec.build(design.n_classes(), seed)
        });
        match outcome {
            Ok(outcome) => {
                evaluated += 1;
                let score = outcome.mean_score();
                tracing::debug!(model = %kind, score, params = ?candidate, "Grid candidate scored");
                if best
                    .as_ref()
                    .map_or(true, |(_, incumbent)| is_better(task, score, *incumbent))
                {
                    best = Some((candidate, score));
                }
            }
            Err(err) => {
                failed += 1;
                tracing::debug!(model = %kind, params = ?candidate, error = %err, "Grid candidate failed");
                last_error = Some(err);
            }
        }
    }

    // With every candidate failing, the last failure is the one worth reporting
    let Some((best, score)) = best else {
        tracing::warn!(model = %kind, failed, "No grid candidate could be fitted");
        return Err(last_error.unwrap_or_else(|| {
            ShellError::Model(format!(
                "No hyperparameter candidate could be fitted for {}.",
                kind.command()
            ))
        }));
    };
    Ok(TuneResult {
        best,
        score,
        evaluated,
        failed,
    })
}
