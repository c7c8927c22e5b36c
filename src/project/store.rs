//! In-memory projects, the current-project pointer and the saved-project archive.

use crate::error::ShellError;
use crate::project::persistence::ProjectArchive;
use crate::project::{Project, ProjectKind};
use crate::shell::envelope::Diagnostics;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ProjectStore {
    projects: BTreeMap<String, Project>,
    current: Option<String>,
    archive: ProjectArchive,
}

impl ProjectStore {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects: BTreeMap::new(),
            current: None,
            archive: ProjectArchive::new(projects_dir),
        }
    }

    pub fn projects_dir(&self) -> &Path {
        self.archive.root()
    }

    /// Point the archive somewhere else after `config set projects_dir`.
    pub fn set_projects_dir(&mut self, dir: impl Into<PathBuf>) {
        self.archive.set_root(dir);
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn get(&self, alias: &str) -> Option<&Project> {
        self.projects.get(alias)
    }

    pub fn create(
        &mut self,
        alias: &str,
        kind: ProjectKind,
        description: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, ShellError> {
        check_alias(alias)?;
        if self.projects.contains_key(alias) {
            return Err(ShellError::validation(format!(
                "Project {} already exists.",
                alias
            )));
        }
        if self.archive.exists(alias) {
            diagnostics.warn(format!(
                "Project {} already exists in projects directory.",
                alias
            ));
        }
        self.projects
            .insert(alias.to_string(), Project::new(alias, kind, description));
        self.current = Some(alias.to_string());
        tracing::info!(project = alias, kind = %kind, "Project created");
        Ok(format!(
            "Project created successfully. {} is now the current project.",
            alias
        ))
    }

    /// Remove a project from memory, or with `from_dir` its saved directory.
    pub fn delete(&mut self, alias: &str, from_dir: bool) -> Result<String, ShellError> {
        if from_dir {
            check_alias(alias)?;
            self.archive.remove(alias)?;
            return Ok(format!(
                "Project {} deleted successfully from projects directory.",
                alias
            ));
        }
        if self.projects.remove(alias).is_none() {
            return Err(ShellError::validation(format!(
                "Project {} does not exist.",
                alias
            )));
        }
        if self.current.as_deref() == Some(alias) {
            self.current = None;
        }
        Ok(format!(
            "Project {} deleted successfully. Current project is {}.",
            alias,
            self.current.as_deref().unwrap_or("None")
        ))
    }

    pub fn list_projects(&self) -> Result<String, ShellError> {
        let saved = self.archive.list()?;
        Ok(format!(
            "Projects in use: [{}]\nProjects saved in projects directory: [{}]",
            self.aliases().join(", "),
            saved.join(", ")
        ))
    }

    pub fn set_current_project(&mut self, alias: &str) -> Result<String, ShellError> {
        if !self.projects.contains_key(alias) {
            return Err(ShellError::validation(format!(
                "Project {} does not exist.",
                alias
            )));
        }
        self.current = Some(alias.to_string());
        Ok(format!("Current project set to {}.", alias))
    }

    pub fn current_alias(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_project(&self) -> Result<&Project, ShellError> {
        self.current
            .as_ref()
            .and_then(|alias| self.projects.get(alias))
            .ok_or_else(|| ShellError::validation("No current project set."))
    }

    pub fn current_project_mut(&mut self) -> Result<&mut Project, ShellError> {
        self.current
            .as_ref()
            .and_then(|alias| self.projects.get_mut(alias))
            .ok_or_else(|| ShellError::validation("No current project set."))
    }

    /// `pcp` text; having no current project is not an error here.
    pub fn describe_current(&self) -> String {
        self.current_project()
            .map(Project::describe)
            .unwrap_or_else(|_| "No current project set.".to_string())
    }

    /// Restore a saved project and make it current.
    pub fn load_project(&mut self, alias: &str, diagnostics: &mut Diagnostics) -> Result<String, ShellError> {
        check_alias(alias)?;
        if self.projects.contains_key(alias) {
            return Err(ShellError::validation(format!(
                "Project {} already exists.",
                alias
            )));
        }
        let project = self.archive.load(alias, diagnostics)?;
        self.projects.insert(alias.to_string(), project);
        self.current = Some(alias.to_string());
        Ok(format!("Project {} loaded successfully.", alias))
    }

    /// Save the current project; an existing directory needs `overwrite`.
    pub fn save_current(&self, overwrite: bool) -> Result<String, ShellError> {
        let project = self.current_project()?;
        let alias = project.alias();
        if self.archive.exists(alias) && !overwrite {
            return Err(ShellError::validation(format!(
                "Project {} already exists in projects directory. Use --overwrite true to replace it.",
                alias
            )));
        }
        self.archive.save(project)?;
        Ok(format!("Project {} saved successfully.", alias))
    }
}

/// Aliases name a single directory under the projects directory.
fn check_alias(alias: &str) -> Result<(), ShellError> {
    let invalid = alias.trim().is_empty()
        || alias == "."
        || alias == ".."
        || alias.contains(['/', '\\', ':']);
    if invalid {
        return Err(ShellError::validation(format!(
            "Invalid project name '{}'. Names cannot be empty, . or .., or contain /, \\ or :.",
            alias
        )));
    }
    Ok(())
}
