//! Feature matrix and target construction.

use crate::data::frame::{format_number, Cell, DataFrame};
use crate::error::ShellError;
use crate::project::kind::ProjectKind;
use crate::shell::envelope::Diagnostics;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// More distinct target values than this in a classification project earns a warning.
pub const MAX_CLASSES_BEFORE_WARNING: usize = 20;

/// Feature matrix plus target, ready for fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_names: Vec<String>,
    pub target: String,
    /// Sorted class labels; `y` holds indices into this list. Empty for regression.
    pub classes: Vec<String>,
}

impl Design {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Build `X` and `y` from `frame`.
///
/// Drops columns named `id`, one-hot encodes text features as `<col>_<value>` and maps
/// classification targets to sorted class indices.
pub fn design_matrix(
    frame: &DataFrame,
    target: &str,
    kind: ProjectKind,
    diagnostics: &mut Diagnostics,
) -> Result<Design, ShellError> {
    let target_column = frame
        .column(target)
        .ok_or_else(|| ShellError::validation(format!("Target column {} not in dataframe.", target)))?;

    let mut working = frame.clone();
    let dropped = working.drop_columns_where(|name| name == "id" && name != target);
    if !dropped.is_empty() {
        tracing::debug!(?dropped, "Dropped identifier columns");
    }
    if working.has_missing() {
        return Err(ShellError::validation(
            "Data contains missing values. Run clean_data first.",
        ));
    }
    if working.n_rows() == 0 {
        return Err(ShellError::validation("Dataframe has no rows."));
    }

    let (y, classes) = match kind {
        ProjectKind::Regression => {
            if !target_column.is_numeric() {
                return Err(ShellError::validation(format!(
                    "Target column {} is not numeric; regression projects need a numeric target.",
                    target
                )));
            }
            (Array1::from(target_column.numbers()), Vec::new())
        }
        ProjectKind::Classification => {
            let (y, classes) = encode_classes(&target_column.cells);
            if classes.len() > MAX_CLASSES_BEFORE_WARNING {
                diagnostics.warn(format!(
                    "Target column {} has {} distinct values; is this really a classification project?",
                    target,
                    classes.len()
                ));
            }
            (y, classes)
        }
    };

    let mut feature_names = Vec::new();
    let mut feature_columns: Vec<Vec<f64>> = Vec::new();
    for column in working.columns().iter().filter(|c| c.name != target) {
        if column.is_numeric() {
            feature_names.push(column.name.clone());
            feature_columns.push(column.numbers());
            continue;
        }
        let levels: BTreeSet<String> = column.cells.iter().map(Cell::to_string).collect();
        for level in levels {
            feature_names.push(format!("{}_{}", column.name, level));
            feature_columns.push(
                column
                    .cells
                    .iter()
                    .map(|cell| if cell.to_string() == level { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }
    if feature_names.is_empty() {
        return Err(ShellError::validation(
            "No feature columns left after removing the target.",
        ));
    }

    let n_rows = working.n_rows();
    let x = Array2::from_shape_fn((n_rows, feature_columns.len()), |(row, col)| {
        feature_columns[col][row]
    });

    Ok(Design {
        x,
        y,
        feature_names,
        target: target.to_string(),
        classes,
    })
}

/// Map labels to indices into the sorted label set (numeric labels sort numerically).
fn encode_classes(cells: &[Cell]) -> (Array1<f64>, Vec<String>) {
    let numeric = cells.iter().all(|c| matches!(c, Cell::Number(_)));
    let classes: Vec<String> = if numeric {
        let mut values: Vec<f64> = cells.iter().filter_map(Cell::as_number).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        values.into_iter().map(format_number).collect()
    } else {
        cells
            .iter()
            .map(Cell::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    let y = cells
        .iter()
        .map(|cell| {
            let label = cell.to_string();
            classes.iter().position(|c| *c == label).unwrap_or(0) as f64
        })
        .collect();
    (y, classes)
}
