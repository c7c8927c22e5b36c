//! Fitting, tuning and summarizing models through the shell.

use crate::integration::{classification_csv, regression_csv, run, TestWorkspace};
use mlsh::project::ModelKind;
use mlsh::shell::Shell;

fn classification_shell(ws: &TestWorkspace) -> Shell<Vec<u8>> {
    ws.write_data("flowers.csv", &classification_csv());
    let mut shell = ws.shell();
    run(&mut shell, "create flowers c; add_data flowers; clean_data; make_x_y species");
    shell
}

fn regression_shell(ws: &TestWorkspace) -> Shell<Vec<u8>> {
    ws.write_data("line.csv", &regression_csv());
    let mut shell = ws.shell();
    run(&mut shell, "create line r; add_data line; clean_data; make_x_y y");
    shell
}

#[test]
fn test_model_commands_need_design_matrix() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    assert_eq!(run(&mut shell, "linreg"), "Error: No current project set.\n");
    run(&mut shell, "create p1 r");
    assert_eq!(
        run(&mut shell, "linreg"),
        "Error: X and y not set. Run make_x_y first.\n"
    );
    assert_eq!(run(&mut shell, "summary"), "No models logged yet.\n");
}

#[test]
fn test_decision_tree_separates_classes() {
    let ws = TestWorkspace::new();
    let mut shell = classification_shell(&ws);

    let printed = run(&mut shell, "decisiontree --max_depth 3");
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines[0], "Model decision_tree logged successfully.");
    assert!(lines[1].starts_with("Note: CI: ["));

    let record = &shell.session().store.current_project().unwrap().models()[0];
    assert_eq!(record.model, ModelKind::DecisionTree);
    assert_eq!(record.n_splits, 3);
    assert!((record.score - 1.0).abs() < 1e-12);
}

#[test]
fn test_cv_overrides_apply_per_call() {
    let ws = TestWorkspace::new();
    let mut shell = classification_shell(&ws);
    run(&mut shell, "naivebayes --n_splits 5 --shuffle true --random_state 7");
    let record = &shell.session().store.current_project().unwrap().models()[0];
    assert_eq!(record.n_splits, 5);
}

#[test]
fn test_refitting_replaces_the_record() {
    let ws = TestWorkspace::new();
    let mut shell = classification_shell(&ws);
    run(&mut shell, "naivebayes; naivebayes --n_splits 2");
    let models = shell.session().store.current_project().unwrap().models();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].n_splits, 2);
}

#[test]
fn test_wrong_project_type_is_rejected() {
    let ws = TestWorkspace::new();
    let mut shell = regression_shell(&ws);
    let printed = run(&mut shell, "randomforest");
    assert!(printed.starts_with("Error: Model randomforest is a classification model"));
    assert!(shell
        .session()
        .store
        .current_project()
        .unwrap()
        .models()
        .is_empty());
}

#[test]
fn test_linear_regression_fits_a_line() {
    let ws = TestWorkspace::new();
    let mut shell = regression_shell(&ws);
    let printed = run(&mut shell, "linreg");
    assert!(printed.starts_with("Model linear_regression logged successfully.\n"));

    let record = &shell.session().store.current_project().unwrap().models()[0];
    assert!(record.score < 1e-6, "mse was {}", record.score);
    let summary = run(&mut shell, "summary");
    assert!(summary.contains("MSE"));
    assert!(summary.contains("linear_regression"));
}

#[test]
fn test_tune_logs_best_candidate() {
    let ws = TestWorkspace::new();
    let mut shell = classification_shell(&ws);
    let printed = run(&mut shell, "tune decisiontree --n_values 2");
    assert!(printed.starts_with("Model decision_tree logged successfully.\n"));
    assert!(printed.contains("Note: Best parameters for decision_tree: "));

    let record = &shell.session().store.current_project().unwrap().models()[0];
    assert_eq!(record.n_splits, 3, "the winner is scored with the standard folds");
}

#[test]
fn test_tune_rejects_unknown_model() {
    let ws = TestWorkspace::new();
    let mut shell = classification_shell(&ws);
    assert_eq!(
        run(&mut shell, "tune svm"),
        "Error: Invalid value for 'model': unknown model svm\n"
    );
}

#[test]
fn test_runall_covers_every_regression_model() {
    let ws = TestWorkspace::new();
    let mut shell = regression_shell(&ws);
    let printed = run(&mut shell, "runall --n_values 1");
    assert!(printed.contains("Model linear_regression logged successfully."));

    let logged = shell.session().store.current_project().unwrap().models().len();
    let skipped = printed
        .lines()
        .filter(|line| line.ends_with("failed. Skipping..."))
        .count();
    assert_eq!(logged + skipped, 2);
}

#[test]
fn test_tune_reports_bad_fold_counts() {
    let ws = TestWorkspace::new();
    let mut shell = regression_shell(&ws);
    assert_eq!(
        run(&mut shell, "tune linreg --cv 1"),
        "Error: Model error: n_splits must be at least 2, got 1\n"
    );
    assert_eq!(
        run(&mut shell, "tune mlpreg --n_values 1 --cv 20"),
        "Error: Model error: Cannot have n_splits=20 greater than the number of samples: n_samples=12.\n"
    );
    assert!(shell
        .session()
        .store
        .current_project()
        .unwrap()
        .models()
        .is_empty());
}
