//! Plot queue and PCA through the shell.

use crate::integration::{classification_csv, run, TestWorkspace};
use mlsh::shell::Shell;

fn flowers(ws: &TestWorkspace) -> Shell<Vec<u8>> {
    ws.write_data("flowers.csv", &classification_csv());
    let mut shell = ws.shell();
    run(&mut shell, "create flowers c; add_data flowers");
    shell
}

#[test]
fn test_queue_then_show() {
    let ws = TestWorkspace::new();
    let mut shell = flowers(&ws);

    assert_eq!(
        run(&mut shell, "plot hist width"),
        "Queued 1 plot(s); 1 waiting. Use show to render them.\n"
    );
    assert_eq!(
        run(&mut shell, "plot box [width, height]"),
        "Queued 2 plot(s); 3 waiting. Use show to render them.\n"
    );
    let rendered = run(&mut shell, "show");
    assert!(rendered.contains("width"));
    assert!(rendered.contains("height"));
    assert_eq!(shell.session().store.current_project().unwrap().queued_plots(), 0);
    assert_eq!(run(&mut shell, "show"), "Error: No plots to show.\n");
}

#[test]
fn test_scatter_needs_two_labels() {
    let ws = TestWorkspace::new();
    let mut shell = flowers(&ws);
    assert_eq!(
        run(&mut shell, "plot scatter width"),
        "Error: Scatter needs exactly two labels, got 1.\n"
    );
    let rendered = run(&mut shell, "plot scatter [width, height] --show true");
    assert!(rendered.contains("x: width, y: height"));
    assert_eq!(shell.session().store.current_project().unwrap().queued_plots(), 0);
}

#[test]
fn test_plot_rejects_bad_columns() {
    let ws = TestWorkspace::new();
    let mut shell = flowers(&ws);
    assert_eq!(
        run(&mut shell, "plot hist petal"),
        "Error: Column petal not in dataframe.\n"
    );
    assert_eq!(
        run(&mut shell, "plot hist species"),
        "Error: Column species is not numeric.\n"
    );
    assert_eq!(run(&mut shell, "plot pie width"), "Error: Invalid command pie.\n");
}

#[test]
fn test_close_discards_queue() {
    let ws = TestWorkspace::new();
    let mut shell = flowers(&ws);
    run(&mut shell, "plot hist [width, height]");
    assert_eq!(run(&mut shell, "plot close"), "Closed 2 queued plot(s).\n");
    assert_eq!(run(&mut shell, "show"), "Error: No plots to show.\n");
}

#[test]
fn test_pca_run_and_plot() {
    let ws = TestWorkspace::new();
    let mut shell = flowers(&ws);
    assert_eq!(
        run(&mut shell, "pca run"),
        "Error: X and y not set. Run make_x_y first.\n"
    );
    run(&mut shell, "clean_data; make_x_y species");
    assert_eq!(
        run(&mut shell, "pca plot"),
        "Error: PCA has not been run. Use pca run first.\n"
    );

    let printed = run(&mut shell, "pca run --show true");
    assert!(printed.starts_with("Warning: show argument will be ignored for run command.\n"));
    assert!(printed.contains("PC1"));
    assert!(printed.contains("PC2"));

    let rendered = run(&mut shell, "pca plot --show true");
    assert!(rendered.contains("PCA Visualization"));
    assert!(rendered.contains("Explained Variance Ratio of PCA Components"));
    assert!(rendered.contains("Feature Weights of PCA Components"));
}
