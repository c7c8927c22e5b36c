//! Configuration System
//!
//! Layered configuration: built-in defaults, the global user file, the workspace file and
//! `MLSH__SECTION__KEY` environment variables, merged with the `config` crate.

use crate::error::ShellError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Where projects are saved and datasets are read from
    #[serde(default)]
    pub paths: PathsConfig,

    /// Interactive shell behavior
    #[serde(default)]
    pub shell: ShellSettings,

    /// Cross-validation and tuning defaults
    #[serde(default)]
    pub ml: MlSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Directory keys that `config get` / `config set` accept.
pub const PATH_KEYS: [&str; 2] = ["projects_dir", "data_dir"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("projects")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            data_dir: default_data_dir(),
        }
    }
}

impl PathsConfig {
    /// Look up a directory by its `config` key.
    pub fn get(&self, key: &str) -> Option<&Path> {
        match key {
            "projects_dir" => Some(self.projects_dir.as_path()),
            "data_dir" => Some(self.data_dir.as_path()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: PathBuf) -> Result<(), ShellError> {
        match key {
            "projects_dir" => self.projects_dir = value,
            "data_dir" => self.data_dir = value,
            _ => return Err(ShellError::validation("Invalid directory")),
        }
        Ok(())
    }

    /// Resolve relative directories against the workspace root.
    pub fn resolve(&self, workspace_root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            projects_dir: absolutize(workspace_root, &self.projects_dir),
            data_dir: absolutize(workspace_root, &self.data_dir),
        }
    }
}

fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Directories after resolution against the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub projects_dir: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellSettings {
    /// Prompt marker printed before each read
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Lowercase every statement before parsing
    #[serde(default = "default_true")]
    pub fold_case: bool,

    /// Colorize rendered envelopes
    #[serde(default = "default_true")]
    pub color: bool,

    /// Line-editor history file (interactive sessions only)
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

fn default_prompt() -> String {
    ">> ".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            fold_case: default_true(),
            color: default_true(),
            history_file: None,
        }
    }
}

impl ShellSettings {
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "mlsh")
                .map(|dirs| dirs.data_dir().join("history.txt"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlSettings {
    /// Default number of cross-validation folds
    #[serde(default = "default_n_splits")]
    pub n_splits: usize,

    #[serde(default)]
    pub shuffle: bool,

    /// Seed used when shuffling folds or seeding estimators
    #[serde(default = "default_random_state")]
    pub random_state: u64,

    /// Folds used while scoring grid-search candidates
    #[serde(default = "default_tuning_folds")]
    pub tuning_folds: usize,
}

fn default_n_splits() -> usize {
    10
}

fn default_random_state() -> u64 {
    42
}

fn default_tuning_folds() -> usize {
    5
}

impl Default for MlSettings {
    fn default() -> Self {
        Self {
            n_splits: default_n_splits(),
            shuffle: false,
            random_state: default_random_state(),
            tuning_folds: default_tuning_folds(),
        }
    }
}

impl ShellConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.paths.projects_dir.as_os_str().is_empty() {
            errors.push("paths.projects_dir cannot be empty".to_string());
        }
        if self.paths.data_dir.as_os_str().is_empty() {
            errors.push("paths.data_dir cannot be empty".to_string());
        }
        if self.ml.n_splits < 2 {
            errors.push(format!(
                "ml.n_splits must be at least 2 (got {})",
                self.ml.n_splits
            ));
        }
        if self.ml.tuning_folds < 2 {
            errors.push(format!(
                "ml.tuning_folds must be at least 2 (got {})",
                self.ml.tuning_folds
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
