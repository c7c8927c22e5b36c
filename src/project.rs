//! Projects: a data frame, its design matrix, logged models and queued plots.
//!
//! A [`Project`] is owned by the [`ProjectStore`], which also knows where projects are
//! saved. Every operation that can warn or note takes the per-call [`Diagnostics`].

pub mod kind;
pub mod persistence;
pub mod plots;
pub mod store;

use crate::data::csv_io::{find_dataset, read_csv};
use crate::data::describe::{columns_table, head_table, stats_table};
use crate::data::{design_matrix, DataFrame, Design};
use crate::error::ShellError;
use crate::ml::cross_validation::CvOutcome;
use crate::ml::params::Hyperparams;
use crate::ml::pca::PcaModel;
use crate::ml::stats::{accuracy_interval, mse_interval, ScoreInterval, ALPHA};
use crate::shell::envelope::{Diagnostics, Output};
use chrono::{DateTime, Utc};
use comfy_table::Table;
use ndarray::Array1;
use plots::{Marks, Plot, PlotQueue, PlotRequest};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use kind::{ModelKind, ProjectKind};
pub use store::ProjectStore;

const NO_DATA: &str = "Project has no dataframe. Use add_data to add a dataframe.";
const NO_DESIGN: &str = "X and y not set. Run make_x_y first.";
const TOP_FEATURES: usize = 3;

/// One logged model: its out-of-fold score interval and the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub model: ModelKind,
    pub score: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Mean of the per-fold scores
    pub cv_mean: f64,
    pub n_splits: usize,
    pub params: Hyperparams,
    #[serde(default)]
    pub importances: Vec<(String, f64)>,
    pub logged_at: DateTime<Utc>,
}

impl ModelRecord {
    pub fn interval(&self) -> ScoreInterval {
        ScoreInterval {
            score: self.score,
            lower: self.ci_lower,
            upper: self.ci_upper,
        }
    }
}

/// Everything a cross-validated fit hands to [`Project::log_model`].
pub struct FitReport {
    pub model: ModelKind,
    pub predictions: Array1<f64>,
    pub fold_scores: Vec<f64>,
    pub n_parameters: usize,
    pub params: Hyperparams,
    pub importances: Option<Array1<f64>>,
}

impl FitReport {
    pub fn from_outcome(model: ModelKind, outcome: &CvOutcome, params: Hyperparams) -> Self {
        Self {
            model,
            predictions: outcome.predictions.clone(),
            fold_scores: outcome.fold_scores.clone(),
            n_parameters: outcome.final_model.n_parameters(),
            params,
            importances: outcome.final_model.feature_importances(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    alias: String,
    kind: ProjectKind,
    description: String,
    cleaned: bool,
    frame: Option<DataFrame>,
    design: Option<Design>,
    models: Vec<ModelRecord>,
    pca: Option<PcaModel>,
    plots: PlotQueue,
}

impl Project {
    pub fn new(alias: impl Into<String>, kind: ProjectKind, description: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            kind,
            description: description.into(),
            cleaned: false,
            frame: None,
            design: None,
            models: Vec::new(),
            pca: None,
            plots: PlotQueue::default(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }

    pub fn frame(&self) -> Option<&DataFrame> {
        self.frame.as_ref()
    }

    fn require_frame(&self) -> Result<&DataFrame, ShellError> {
        self.frame
            .as_ref()
            .ok_or_else(|| ShellError::validation(NO_DATA))
    }

    pub fn design(&self) -> Result<&Design, ShellError> {
        self.design
            .as_ref()
            .ok_or_else(|| ShellError::validation(NO_DESIGN))
    }

    pub fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    pub fn queued_plots(&self) -> usize {
        self.plots.len()
    }

    /// `pcp` line.
    pub fn describe(&self) -> String {
        let mut text = format!("Project: {}, Type: {}", self.alias, self.kind);
        if !self.description.is_empty() {
            text.push_str(&format!(", Description: {}", self.description));
        }
        text
    }

    /// Load `<data_dir>/<name>.csv`, replacing any previous data and everything derived from it.
    pub fn add_df(&mut self, data_dir: &Path, name: &str, delimiter: u8) -> Result<String, ShellError> {
        let path = find_dataset(data_dir, name)
            .ok_or_else(|| ShellError::validation(format!("Dataframe {} not found.", name)))?;
        let frame = read_csv(&path, delimiter)?;
        tracing::info!(
            project = %self.alias,
            path = %path.display(),
            rows = frame.n_rows(),
            cols = frame.n_cols(),
            "Loaded dataframe"
        );
        self.frame = Some(frame);
        self.cleaned = false;
        self.design = None;
        self.pca = None;
        Ok(format!("Dataframe {}.csv added successfully.", name))
    }

    pub fn read_data(&self, head: usize) -> Result<Table, ShellError> {
        Ok(head_table(self.require_frame()?, head))
    }

    pub fn list_cols(&self) -> Result<Table, ShellError> {
        Ok(columns_table(self.require_frame()?))
    }

    pub fn make_x_y(&mut self, target: &str, diagnostics: &mut Diagnostics) -> Result<String, ShellError> {
        let frame = self.require_frame()?;
        if !self.cleaned {
            diagnostics.warn(
                "Data not cleaned. Run clean_data and rerun make_x_y to be safe...",
            );
        }
        let design = design_matrix(frame, target, self.kind, diagnostics)?;
        tracing::debug!(
            project = %self.alias,
            samples = design.n_samples(),
            features = design.n_features(),
            "Built design matrix"
        );
        self.design = Some(design);
        self.pca = None;
        Ok("X and y created successfully.".to_string())
    }

    pub fn clean_data(&mut self) -> Result<String, ShellError> {
        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| ShellError::validation(NO_DATA))?;
        let dropped = frame.drop_missing_rows();
        self.cleaned = true;
        Ok(format!(
            "Data cleaned successfully. Observations dropped: {}",
            dropped
        ))
    }

    pub fn stats(&self) -> Result<Table, ShellError> {
        stats_table(self.require_frame()?)
            .ok_or_else(|| ShellError::validation("Dataframe has no numeric columns."))
    }

    /// Score out-of-fold predictions, note the interval and record the model.
    ///
    /// Logging a model again replaces its previous record.
    pub fn log_model(&mut self, report: FitReport, diagnostics: &mut Diagnostics) -> Result<String, ShellError> {
        report.model.check_task(self.kind)?;
        let design = self.design()?;
        let interval = match self.kind {
            ProjectKind::Classification => {
                accuracy_interval(&design.y, &report.predictions, ALPHA)?
            }
            ProjectKind::Regression => {
                mse_interval(&design.y, &report.predictions, report.n_parameters, ALPHA)?
            }
        };
        diagnostics.note(interval.note());

        let importances = report
            .importances
            .map(|values| {
                design
                    .feature_names
                    .iter()
                    .cloned()
                    .zip(values.iter().copied())
                    .collect()
            })
            .unwrap_or_default();
        let cv_mean = if report.fold_scores.is_empty() {
            f64::NAN
        } else {
            report.fold_scores.iter().sum::<f64>() / report.fold_scores.len() as f64
        };
        let record = ModelRecord {
            model: report.model,
            score: interval.score,
            ci_lower: interval.lower,
            ci_upper: interval.upper,
            cv_mean,
            n_splits: report.fold_scores.len(),
            params: report.params,
            importances,
            logged_at: Utc::now(),
        };
        tracing::info!(
            project = %self.alias,
            model = record.model.log_name(),
            score = record.score,
            "Model logged"
        );

        match self.models.iter_mut().find(|m| m.model == record.model) {
            Some(existing) => *existing = record,
            None => self.models.push(record),
        }
        Ok(format!("Model {} logged successfully.", report.model.log_name()))
    }

    pub fn summary(&self) -> Output {
        if self.models.is_empty() {
            return Output::Text("No models logged yet.".to_string());
        }
        let metric = match self.kind {
            ProjectKind::Classification => "Accuracy",
            ProjectKind::Regression => "MSE",
        };
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec![
            "Model",
            metric,
            "CI lower",
            "CI upper",
            "Fold mean",
            "Folds",
            "Top features",
            "Hyperparameters",
        ]);
        for record in &self.models {
            table.add_row(vec![
                record.model.log_name().to_string(),
                format!("{:.4}", record.score),
                format!("{:.4}", record.ci_lower),
                format!("{:.4}", record.ci_upper),
                format!("{:.4}", record.cv_mean),
                record.n_splits.to_string(),
                top_features(&record.importances),
                record
                    .params
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ]);
        }
        Output::Table(table)
    }

    /// Fit PCA on the standardized feature matrix.
    pub fn run_pca(&mut self) -> Result<Table, ShellError> {
        let design = self.design()?;
        let pca = PcaModel::fit(&design.x, design.feature_names.clone())?;

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Component", "Explained variance", "Ratio", "Cumulative"]);
        for (i, cumulative) in pca.cumulative_ratio().into_iter().enumerate() {
            table.add_row(vec![
                format!("PC{}", i + 1),
                format!("{:.4}", pca.explained_variance[i]),
                format!("{:.4}", pca.explained_variance_ratio[i]),
                format!("{:.4}", cumulative),
            ]);
        }
        tracing::debug!(project = %self.alias, components = pca.n_components(), "PCA fitted");
        self.pca = Some(pca);
        Ok(table)
    }

    /// Queue the projection, explained variance and loading plots.
    pub fn plot_pca(&mut self, show: bool) -> Result<Output, ShellError> {
        let pca = self
            .pca
            .as_ref()
            .ok_or_else(|| ShellError::validation("PCA has not been run. Use pca run first."))?;
        let design = self.design()?;

        let projected = pca.transform(&design.x, 2);
        let first: Vec<f64> = projected.column(0).to_vec();
        let second: Vec<f64> = if projected.ncols() > 1 {
            projected.column(1).to_vec()
        } else {
            vec![0.0; first.len()]
        };
        let marks = match self.kind {
            ProjectKind::Classification => Marks::Classes {
                index: design.y.iter().map(|&class| class as usize).collect(),
                names: design.classes.clone(),
            },
            ProjectKind::Regression => Marks::Shaded(design.y.to_vec()),
        };
        let queued = [
            Plot::Scatter {
                title: "PCA Visualization".to_string(),
                x_label: "Principal Component 1".to_string(),
                y_label: "Principal Component 2".to_string(),
                x: first,
                y: second,
                marks,
            },
            Plot::ExplainedVariance {
                ratios: pca.explained_variance_ratio.to_vec(),
            },
            Plot::Loadings {
                features: pca.feature_names.clone(),
                components: pca.components.rows().into_iter().map(|row| row.to_vec()).collect(),
            },
        ];
        for plot in queued {
            self.plots.push(plot);
        }
        if show {
            return self.show().map(Output::Text);
        }
        Ok(Output::Text(
            "PCA plots queued. Use show to render them.".to_string(),
        ))
    }

    /// Queue (or, with `show`, render right away) plots of data frame columns.
    pub fn plot(&mut self, request: &PlotRequest, show: bool) -> Result<Output, ShellError> {
        let drawn = match request {
            PlotRequest::Show => return self.show().map(Output::Text),
            PlotRequest::Close => {
                let dropped = self.plots.close();
                return Ok(Output::Text(format!("Closed {} queued plot(s).", dropped)));
            }
            PlotRequest::Hist(labels) => labels
                .iter()
                .map(|label| {
                    Ok(Plot::Histogram {
                        label: label.clone(),
                        values: self.numeric_column(label)?.into_iter().flatten().collect(),
                    })
                })
                .collect::<Result<Vec<_>, ShellError>>()?,
            PlotRequest::Box(labels) => labels
                .iter()
                .map(|label| {
                    Ok(Plot::Boxplot {
                        label: label.clone(),
                        values: self.numeric_column(label)?.into_iter().flatten().collect(),
                    })
                })
                .collect::<Result<Vec<_>, ShellError>>()?,
            PlotRequest::Scatter { x, y } => {
                let (xs, ys): (Vec<f64>, Vec<f64>) = self
                    .numeric_column(x)?
                    .into_iter()
                    .zip(self.numeric_column(y)?)
                    .filter_map(|pair| match pair {
                        (Some(a), Some(b)) => Some((a, b)),
                        _ => None,
                    })
                    .unzip();
                vec![Plot::Scatter {
                    title: format!("Scatter plot of {} vs {}", x, y),
                    x_label: x.clone(),
                    y_label: y.clone(),
                    x: xs,
                    y: ys,
                    marks: Marks::Plain,
                }]
            }
        };

        if show {
            let rendered = drawn
                .iter()
                .map(Plot::render)
                .collect::<Vec<_>>()
                .join("\n\n");
            return Ok(Output::Text(rendered));
        }
        let added = drawn.len();
        for plot in drawn {
            self.plots.push(plot);
        }
        Ok(Output::Text(format!(
            "Queued {} plot(s); {} waiting. Use show to render them.",
            added,
            self.plots.len()
        )))
    }

    /// Render and clear the plot queue.
    pub fn show(&mut self) -> Result<String, ShellError> {
        self.plots.show()
    }

    /// Column values by row, `None` where the cell is missing.
    fn numeric_column(&self, label: &str) -> Result<Vec<Option<f64>>, ShellError> {
        let frame = self.require_frame()?;
        let column = frame
            .column(label)
            .ok_or_else(|| ShellError::validation(format!("Column {} not in dataframe.", label)))?;
        if !column.is_numeric() {
            return Err(ShellError::validation(format!(
                "Column {} is not numeric.",
                label
            )));
        }
        Ok(column.cells.iter().map(|cell| cell.as_number()).collect())
    }
}

fn top_features(importances: &[(String, f64)]) -> String {
    let mut ranked: Vec<&(String, f64)> = importances.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(TOP_FEATURES)
        .map(|(name, weight)| format!("{} ({:.3})", name, weight))
        .collect::<Vec<_>>()
        .join("\n")
}
