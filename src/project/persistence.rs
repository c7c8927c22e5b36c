//! On-disk project directories.
//!
//! `<projects_dir>/<alias>/` holds `metadata.json`, `df.csv`, `modeldata.json` and
//! `design.json`. The data and design files are only written when the project has them.

use crate::data::csv_io::{read_csv, write_csv};
use crate::data::Design;
use crate::error::{ShellError, StorageError};
use crate::project::{ModelRecord, Project, ProjectKind};
use crate::shell::envelope::Diagnostics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const DATA_FILE: &str = "df.csv";
pub const MODELS_FILE: &str = "modeldata.json";
pub const DESIGN_FILE: &str = "design.json";

/// The only files a saved project directory may contain.
pub const PROJECT_FILES: [&str; 4] = [METADATA_FILE, DATA_FILE, MODELS_FILE, DESIGN_FILE];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    #[serde(default)]
    pub description: String,
    pub cleaned: bool,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub target: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Saved projects under one directory.
#[derive(Debug, Clone)]
pub struct ProjectArchive {
    root: PathBuf,
}

impl ProjectArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    pub fn project_dir(&self, alias: &str) -> PathBuf {
        self.root.join(alias)
    }

    pub fn exists(&self, alias: &str) -> bool {
        self.project_dir(alias).is_dir()
    }

    /// Names of saved project directories, sorted. A missing root lists nothing.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write every part of `project`, removing stale parts it no longer has.
    pub fn save(&self, project: &Project) -> Result<PathBuf, StorageError> {
        let dir = self.project_dir(project.alias());
        fs::create_dir_all(&dir)?;

        let design = project.design.as_ref();
        let metadata = ProjectMetadata {
            kind: project.kind(),
            description: project.description().to_string(),
            cleaned: project.is_cleaned(),
            feature_names: design.map(|d| d.feature_names.clone()).unwrap_or_default(),
            classes: design.map(|d| d.classes.clone()).unwrap_or_default(),
            target: design.map(|d| d.target.clone()),
            saved_at: Utc::now(),
        };
        write_json(&dir.join(METADATA_FILE), &metadata)?;
        write_json(&dir.join(MODELS_FILE), &project.models)?;

        match project.frame() {
            Some(frame) => write_csv(frame, &dir.join(DATA_FILE))?,
            None => remove_if_present(&dir.join(DATA_FILE))?,
        }
        match design {
            Some(design) => write_json(&dir.join(DESIGN_FILE), design)?,
            None => remove_if_present(&dir.join(DESIGN_FILE))?,
        }
        tracing::info!(project = project.alias(), dir = %dir.display(), "Project saved");
        Ok(dir)
    }

    /// Rebuild a project from its directory.
    pub fn load(&self, alias: &str, diagnostics: &mut Diagnostics) -> Result<Project, ShellError> {
        let dir = self.project_dir(alias);
        let metadata_path = dir.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Err(ShellError::validation(format!("Project {} not found.", alias)));
        }
        let metadata: ProjectMetadata = read_json(&metadata_path)?;

        let mut project = Project::new(alias, metadata.kind, metadata.description);
        project.cleaned = metadata.cleaned;

        let data_path = dir.join(DATA_FILE);
        if data_path.is_file() {
            project.frame = Some(read_csv(&data_path, b',')?);
        }
        let design_path = dir.join(DESIGN_FILE);
        if design_path.is_file() {
            project.design = Some(read_json::<Design>(&design_path)?);
        }
        let models_path = dir.join(MODELS_FILE);
        if models_path.is_file() {
            project.models = read_json::<Vec<ModelRecord>>(&models_path)?;
        } else {
            diagnostics.warn("Model data not found.");
        }
        tracing::info!(project = alias, models = project.models.len(), "Project loaded");
        Ok(project)
    }

    /// Delete a saved project directory. Refuses when it holds anything unexpected.
    pub fn remove(&self, alias: &str) -> Result<(), ShellError> {
        let dir = self.project_dir(alias);
        if !dir.is_dir() {
            return Err(ShellError::validation(format!(
                "Project {} does not exist in projects directory.",
                alias
            )));
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(StorageError::from)? {
            let entry = entry.map_err(StorageError::from)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !PROJECT_FILES.contains(&name.as_str()) || !entry.path().is_file() {
                return Err(StorageError::UnexpectedFile(name).into());
            }
            files.push(entry.path());
        }
        for file in files {
            fs::remove_file(file).map_err(StorageError::from)?;
        }
        fs::remove_dir(&dir).map_err(StorageError::from)?;
        tracing::info!(project = alias, dir = %dir.display(), "Saved project removed");
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{FitReport, ModelKind};
    use ndarray::Array1;
    use tempfile::TempDir;

    fn fitted_project(data_dir: &Path) -> Project {
        fs::write(
            data_dir.join("cars.csv"),
            "speed,dist\n4,2\n7,4\n8,16\n9,10\n10,18\n11,17\n",
        )
        .unwrap();
        let mut project = Project::new("cars", ProjectKind::Regression, "braking");
        project.add_df(data_dir, "cars", b',').unwrap();
        project.clean_data().unwrap();
        project.make_x_y("dist", &mut Diagnostics::new()).unwrap();
        let report = FitReport {
            model: ModelKind::LinearRegression,
            predictions: Array1::from(vec![3.0, 6.0, 12.0, 11.0, 15.0, 18.0]),
            fold_scores: vec![4.0, 6.0],
            n_parameters: 2,
            params: Default::default(),
            importances: None,
        };
        project.log_model(report, &mut Diagnostics::new()).unwrap();
        project
    }

    #[test]
    fn test_save_then_load_restores_state() {
        let temp = TempDir::new().unwrap();
        let archive = ProjectArchive::new(temp.path().join("projects"));
        let project = fitted_project(temp.path());

        let dir = archive.save(&project).unwrap();
        for file in PROJECT_FILES {
            assert!(dir.join(file).is_file(), "{} missing", file);
        }
        assert_eq!(archive.list().unwrap(), vec!["cars".to_string()]);

        let mut diagnostics = Diagnostics::new();
        let loaded = archive.load("cars", &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(loaded.kind(), ProjectKind::Regression);
        assert_eq!(loaded.description(), "braking");
        assert!(loaded.is_cleaned());
        assert_eq!(loaded.frame(), project.frame());
        assert_eq!(loaded.design().unwrap(), project.design().unwrap());
        assert_eq!(loaded.models(), project.models());
    }

    #[test]
    fn test_load_without_models_warns() {
        let temp = TempDir::new().unwrap();
        let archive = ProjectArchive::new(temp.path());
        archive.save(&Project::new("bare", ProjectKind::Classification, "")).unwrap();
        fs::remove_file(archive.project_dir("bare").join(MODELS_FILE)).unwrap();

        let mut diagnostics = Diagnostics::new();
        let project = archive.load("bare", &mut diagnostics).unwrap();
        assert!(project.frame().is_none());
        assert_eq!(diagnostics.warnings(), &["Model data not found.".to_string()]);
    }

    #[test]
    fn test_load_unknown_project() {
        let temp = TempDir::new().unwrap();
        let archive = ProjectArchive::new(temp.path());
        let err = archive.load("ghost", &mut Diagnostics::new()).unwrap_err();
        assert_eq!(err.to_string(), "Project ghost not found.");
    }

    #[test]
    fn test_remove_refuses_unexpected_files() {
        let temp = TempDir::new().unwrap();
        let archive = ProjectArchive::new(temp.path());
        archive.save(&Project::new("p1", ProjectKind::Regression, "")).unwrap();
        fs::write(archive.project_dir("p1").join("notes.txt"), "keep me").unwrap();

        let err = archive.remove("p1").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected file notes.txt in project directory.");
        assert!(archive.project_dir("p1").join(METADATA_FILE).exists());

        fs::remove_file(archive.project_dir("p1").join("notes.txt")).unwrap();
        archive.remove("p1").unwrap();
        assert!(!archive.exists("p1"));
        assert_eq!(
            archive.remove("p1").unwrap_err().to_string(),
            "Project p1 does not exist in projects directory."
        );
    }
}
