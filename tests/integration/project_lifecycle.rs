//! Project creation, switching, persistence and deletion through the shell.

use crate::integration::{classification_csv, regression_csv, run, TestWorkspace};

#[test]
fn test_create_list_switch_delete() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();

    run(&mut shell, "create alpha r; create beta c --description flowers");
    assert_eq!(
        run(&mut shell, "pcp"),
        "Project: beta, Type: classification, Description: flowers\n"
    );
    assert_eq!(
        run(&mut shell, "listproj"),
        "Projects in use: [alpha, beta]\nProjects saved in projects directory: []\n"
    );
    assert_eq!(run(&mut shell, "chproj alpha"), "Current project set to alpha.\n");
    assert_eq!(
        run(&mut shell, "delete alpha"),
        "Project alpha deleted successfully. Current project is None.\n"
    );
    assert_eq!(
        run(&mut shell, "chproj alpha"),
        "Error: Project alpha does not exist.\n"
    );
    assert_eq!(
        run(&mut shell, "create beta r"),
        "Error: Project beta already exists.\n"
    );
}

#[test]
fn test_data_commands_need_a_dataframe() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r");
    for statement in ["read_data", "list_cols", "clean_data", "stats"] {
        assert_eq!(
            run(&mut shell, statement),
            "Error: Project has no dataframe. Use add_data to add a dataframe.\n",
            "{}",
            statement
        );
    }
    assert_eq!(
        run(&mut shell, "add_data missing"),
        "Error: Dataframe missing not found.\n"
    );
}

#[test]
fn test_data_preparation_flow() {
    let ws = TestWorkspace::new();
    ws.write_data("Line.csv", &regression_csv());
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r");

    assert_eq!(
        run(&mut shell, "add_data line"),
        "Dataframe line.csv added successfully.\n"
    );
    let head = run(&mut shell, "read_data 2");
    assert!(head.contains('x') && head.contains('y'));

    let printed = run(&mut shell, "make_x_y y");
    assert_eq!(
        printed,
        "Warning: Data not cleaned. Run clean_data and rerun make_x_y to be safe...\n\
         Error: Data contains missing values. Run clean_data first.\n"
    );
    assert_eq!(
        run(&mut shell, "clean_data"),
        "Data cleaned successfully. Observations dropped: 1\n"
    );
    assert_eq!(run(&mut shell, "make_x_y y"), "X and y created successfully.\n");
    assert_eq!(
        run(&mut shell, "make_x_y z"),
        "Error: Target column z not in dataframe.\n"
    );

    let stats = run(&mut shell, "stats");
    assert!(stats.contains('x'));
}

#[test]
fn test_save_load_round_trip() {
    let ws = TestWorkspace::new();
    ws.write_data("flowers.csv", &classification_csv());
    let mut shell = ws.shell();

    run(
        &mut shell,
        "create p1 c; add_data flowers; clean_data; make_x_y species; naivebayes",
    );
    assert_eq!(run(&mut shell, "save"), "Project p1 saved successfully.\n");
    assert!(ws.projects_dir().join("p1").is_dir());
    assert!(run(&mut shell, "save").starts_with("Error: Project p1 already exists in projects directory."));
    assert_eq!(
        run(&mut shell, "save --overwrite true"),
        "Project p1 saved successfully.\n"
    );

    assert_eq!(
        run(&mut shell, "load p1"),
        "Error: Project p1 already exists.\n"
    );
    run(&mut shell, "delete p1");
    assert_eq!(run(&mut shell, "load p1"), "Project p1 loaded successfully.\n");

    let project = shell.session().store.current_project().unwrap();
    assert_eq!(project.models().len(), 1);
    assert!(project.is_cleaned());
    assert_eq!(project.design().unwrap().classes, vec!["large", "small"]);
    assert!(run(&mut shell, "summary").contains("naive_bayes"));
}

#[test]
fn test_create_warns_about_saved_project() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r; save; delete p1");
    assert_eq!(
        run(&mut shell, "create p1 r"),
        "Warning: Project p1 already exists in projects directory.\n\
         Project created successfully. p1 is now the current project.\n"
    );
}

#[test]
fn test_delete_from_dir() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r; save");
    assert_eq!(
        run(&mut shell, "delete p1 --from_dir true"),
        "Project p1 deleted successfully from projects directory.\n"
    );
    assert!(!ws.projects_dir().join("p1").exists());
    assert_eq!(
        run(&mut shell, "delete p1 --from_dir true"),
        "Error: Project p1 does not exist in projects directory.\n"
    );
    // The in-memory project is untouched
    assert_eq!(run(&mut shell, "pcp"), "Project: p1, Type: regression\n");
}

#[test]
fn test_project_names_stay_inside_projects_dir() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    run(&mut shell, "create keep r; save");

    for statement in ["create ../escape r", "create '' r", "load ..", "delete '' --from_dir true"] {
        let printed = run(&mut shell, statement);
        assert!(printed.starts_with("Error: Invalid project name"), "{}: {}", statement, printed);
    }
    assert_eq!(run(&mut shell, "pcp"), "Project: keep, Type: regression\n");
    assert!(!ws.path().join("escape").exists());
    assert!(ws.projects_dir().join("keep").join("metadata.json").is_file());
    assert!(!ws.projects_dir().join("metadata.json").exists());
}

#[test]
fn test_malformed_and_empty_files() {
    let ws = TestWorkspace::new();
    ws.write_data("ragged.csv", "x,y\n1,2\n3\n");
    ws.write_data("bare.csv", "x,y\n");
    let mut shell = ws.shell();
    run(&mut shell, "create p1 r");

    let printed = run(&mut shell, "add_data ragged");
    assert!(printed.starts_with("Error: CSV error: "), "{}", printed);
    assert!(!printed.contains("CSV error: CSV error"));

    assert_eq!(
        run(&mut shell, "add_data bare"),
        "Dataframe bare.csv added successfully.\n"
    );
    for statement in ["read_data", "list_cols"] {
        let printed = run(&mut shell, statement);
        assert!(printed.contains('x') && printed.contains('y'), "{}", statement);
        assert!(printed.ends_with("Note: Dataframe has no rows.\n"), "{}", statement);
    }
}
