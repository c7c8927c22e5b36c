//! Shell session: the project store plus the configuration it runs under.
//!
//! Handlers receive the session as their first argument.

use crate::config::{ConfigLoader, ResolvedPaths, ShellConfig};
use crate::error::ShellError;
use crate::project::ProjectStore;
use std::path::{Path, PathBuf};

pub struct Session {
    pub store: ProjectStore,
    config: ShellConfig,
    workspace_root: PathBuf,
    /// Explicit `--config` file; `config set` writes there instead of the workspace file
    config_file: Option<PathBuf>,
    paths: ResolvedPaths,
}

impl Session {
    pub fn new(workspace_root: PathBuf, config: ShellConfig, config_file: Option<PathBuf>) -> Self {
        let paths = config.paths.resolve(&workspace_root);
        Self {
            store: ProjectStore::new(paths.projects_dir.clone()),
            config,
            workspace_root,
            config_file,
            paths,
        }
    }

    /// Load and validate configuration for `workspace_root`, then start an empty session.
    pub fn open(workspace_root: PathBuf, config_file: Option<PathBuf>) -> Result<Self, ShellError> {
        let config = match &config_file {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config
            .validate()
            .map_err(|errors| ShellError::Config(errors.join("; ")))?;
        tracing::debug!(
            workspace = %workspace_root.display(),
            projects_dir = %config.paths.projects_dir.display(),
            data_dir = %config.paths.data_dir.display(),
            "Session configuration loaded"
        );
        Ok(Self::new(workspace_root, config, config_file))
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn data_dir(&self) -> &Path {
        &self.paths.data_dir
    }

    /// Resolved directory for a `config` key.
    pub fn resolved_path(&self, key: &str) -> Result<&Path, ShellError> {
        match key {
            "projects_dir" => Ok(&self.paths.projects_dir),
            "data_dir" => Ok(&self.paths.data_dir),
            _ => Err(ShellError::validation("Invalid directory")),
        }
    }

    /// Point `key` at `value` in the config file it came from, then in memory.
    ///
    /// A failed write leaves the session untouched.
    pub fn set_path(&mut self, key: &str, value: PathBuf) -> Result<(), ShellError> {
        let mut paths = self.config.paths.clone();
        paths.set(key, value.clone())?;
        match &self.config_file {
            Some(file) => ConfigLoader::persist_path_in(file, key, &value)?,
            None => ConfigLoader::persist_path(&self.workspace_root, key, &value)?,
        }
        self.paths = paths.resolve(&self.workspace_root);
        self.config.paths = paths;
        self.store.set_projects_dir(self.paths.projects_dir.clone());
        Ok(())
    }
}
