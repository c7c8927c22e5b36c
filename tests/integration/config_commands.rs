//! `config` commands and configuration layering.

use crate::integration::{run, TestWorkspace};
use mlsh::shell::{Dispatcher, Registry, Renderer, Shell};
use std::fs;

#[test]
fn test_get_reports_resolved_directories() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    assert_eq!(
        run(&mut shell, "config get data_dir"),
        format!("{}\n", ws.data_dir().display())
    );
    assert_eq!(
        run(&mut shell, "config get model_dir"),
        "Error: Invalid directory\n"
    );
    assert_eq!(
        run(&mut shell, "config set projects_dir"),
        "Error: New path must be provided.\n"
    );
}

#[test]
fn test_show_includes_workspace_settings() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let printed = run(&mut shell, "config");
    assert!(printed.contains("ml.n_splits"));
    assert!(printed.contains("ml.tuning_folds"));
}

#[test]
fn test_set_moves_saved_projects() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r; save");
    assert!(ws.projects_dir().join("p1").is_dir());

    assert_eq!(
        run(&mut shell, "config set projects_dir archive"),
        "Path projects_dir set to archive. Files moved accordingly.\n"
    );
    assert!(ws.path().join("archive").join("p1").is_dir());
    assert!(!ws.projects_dir().exists());
    assert!(run(&mut shell, "listproj").contains("Projects saved in projects directory: [p1]"));

    // The new location survives a restart
    let written = fs::read_to_string(ws.config_path()).unwrap();
    assert!(written.contains("projects_dir = \"archive\""));
    assert!(written.contains("n_splits = 3"));
    let mut restarted = ws.shell();
    assert_eq!(
        run(&mut restarted, "load p1"),
        "Project p1 loaded successfully.\n"
    );
}

#[test]
fn test_set_refuses_nested_target() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    ws.write_data("a.csv", "x\n1\n");
    let printed = run(&mut shell, "config set data_dir data/inner");
    assert!(printed.starts_with("Error: New path"));
    assert!(ws.data_dir().join("a.csv").is_file());
}

#[test]
fn test_explicit_config_file_receives_updates() {
    let ws = TestWorkspace::new();
    let file = ws.path().join("custom.toml");
    fs::write(&file, "[ml]\nn_splits = 4\n").unwrap();

    let session = ws.open_session(Some(file.clone()));
    assert_eq!(session.config().ml.n_splits, 4);
    let mut shell = Shell::new(
        Dispatcher::new(Registry::standard().unwrap()),
        session,
        Renderer::new(false),
        Vec::new(),
    );
    run(&mut shell, "config set data_dir datasets");

    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains("data_dir = \"datasets\""));
    let workspace_file = fs::read_to_string(ws.config_path()).unwrap();
    assert!(!workspace_file.contains("datasets"));
}
