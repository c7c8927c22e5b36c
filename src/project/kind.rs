//! Project and model kinds.

use crate::error::{ParseError, ShellError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a project predicts a number or a class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Regression,
    Classification,
}

impl ProjectKind {
    /// Accepts `regression`/`r` and `classification`/`c`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        match text.to_ascii_lowercase().as_str() {
            "r" | "regression" => Ok(ProjectKind::Regression),
            "c" | "classification" => Ok(ProjectKind::Classification),
            other => Err(ParseError::InvalidArgument {
                name: "type".to_string(),
                reason: format!("Invalid project type: {}", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Regression => "regression",
            ProjectKind::Classification => "classification",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every estimator the shell can fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    MlpRegressor,
    NaiveBayes,
    MlpClassifier,
    LogisticRegression,
    DecisionTree,
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        ModelKind::LinearRegression,
        ModelKind::MlpRegressor,
        ModelKind::NaiveBayes,
        ModelKind::MlpClassifier,
        ModelKind::LogisticRegression,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Shell command that fits this model.
    pub fn command(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linreg",
            ModelKind::MlpRegressor => "mlpreg",
            ModelKind::NaiveBayes => "naivebayes",
            ModelKind::MlpClassifier => "mlpclas",
            ModelKind::LogisticRegression => "logisticreg",
            ModelKind::DecisionTree => "decisiontree",
            ModelKind::RandomForest => "randomforest",
            ModelKind::GradientBoosting => "gradientboosting",
        }
    }

    /// Name under which results are logged.
    pub fn log_name(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::MlpRegressor => "mlpreg",
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::MlpClassifier => "mlpclass",
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting_classifier",
        }
    }

    pub fn task(&self) -> ProjectKind {
        match self {
            ModelKind::LinearRegression | ModelKind::MlpRegressor => ProjectKind::Regression,
            _ => ProjectKind::Classification,
        }
    }

    /// Lookup by command name or logged name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.command() == name || kind.log_name() == name)
    }

    pub fn for_task(task: ProjectKind) -> impl Iterator<Item = ModelKind> {
        Self::ALL.into_iter().filter(move |kind| kind.task() == task)
    }

    /// Reject fitting a model against the wrong project type.
    pub fn check_task(&self, project: ProjectKind) -> Result<(), ShellError> {
        if self.task() == project {
            Ok(())
        } else {
            Err(ShellError::validation(format!(
                "Model {} is a {} model; the current project is {}.",
                self.command(),
                self.task(),
                project
            )))
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log_name())
    }
}
