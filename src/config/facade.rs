//! Config loading facade: the one place that knows the source order.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::ShellConfig;
use crate::error::ShellError;
use config::{Environment, File};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace files, env.
    pub fn load(workspace_root: &Path) -> Result<ShellConfig, ShellError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<ShellConfig>()?;
        Ok(config)
    }

    /// Load configuration from one explicit file (replaces the global/workspace files).
    pub fn load_from_file(path: &Path) -> Result<ShellConfig, ShellError> {
        if !path.exists() {
            return Err(ShellError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<ShellConfig>()?;
        Ok(config)
    }

    /// Global user configuration path, if a home directory is known.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }

    /// Rewrite `[paths] <key>` in the workspace file, keeping every other setting.
    pub fn persist_path(workspace_root: &Path, key: &str, value: &Path) -> Result<(), ShellError> {
        Self::persist_path_in(&Self::workspace_config_path(workspace_root), key, value)
    }

    /// Rewrite `[paths] <key>` in an explicit TOML file, creating it when missing.
    pub fn persist_path_in(path: &Path, key: &str, value: &Path) -> Result<(), ShellError> {
        let mut document: toml::Table = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            content.parse().map_err(|e| {
                ShellError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            toml::Table::new()
        };

        let section = document
            .entry("paths")
            .or_insert(toml::Value::Table(toml::Table::new()));
        match section {
            toml::Value::Table(paths) => {
                paths.insert(
                    key.to_string(),
                    toml::Value::String(value.to_string_lossy().into_owned()),
                );
            }
            _ => {
                return Err(ShellError::Config(format!(
                    "[paths] in {} is not a table",
                    path.display()
                )))
            }
        }

        let rendered = toml::to_string_pretty(&document)
            .map_err(|e| ShellError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        tracing::info!(key, value = %value.display(), "Persisted path setting");
        Ok(())
    }

    fn environment() -> Environment {
        Environment::with_prefix("MLSH")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }
}
