//! End-to-end behavior of the read-dispatch-render loop.

use crate::integration::{run, TestWorkspace};
use mlsh::shell::{Flow, ScriptSource};
use std::io::Cursor;

#[test]
fn test_create_then_exit() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();

    let flow = shell.run_line("create p1 regression; exit").unwrap();
    assert_eq!(flow, Flow::Stop);
    let printed = String::from_utf8(shell.output().clone()).unwrap();
    assert_eq!(
        printed,
        "Project created successfully. p1 is now the current project.\n"
    );
    assert!(!printed.contains("Warning:"));
    assert!(!printed.contains("Note:"));
}

#[test]
fn test_double_semicolon_is_two_noops() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    assert_eq!(run(&mut shell, ";;"), "");
    assert_eq!(run(&mut shell, "  ;  "), "");
}

#[test]
fn test_case_folding_note_precedes_error() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let printed = run(&mut shell, "load NonExistingProject");
    assert_eq!(
        printed,
        "Note: Command will be converted to lowercase.\n\
         Error: Project nonexistingproject not found.\n"
    );
}

#[test]
fn test_bad_statement_does_not_end_session() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let printed = run(&mut shell, "frobnicate x; create p1 c; pcp");
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines[0], "Error: Command frobnicate does not exist.");
    assert_eq!(
        lines[1],
        "Project created successfully. p1 is now the current project."
    );
    assert_eq!(lines[2], "Project: p1, Type: classification");
}

#[test]
fn test_missing_flag_value_is_reported() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    assert_eq!(
        run(&mut shell, "create proj --type"),
        "Error: Flag type requires a value.\n"
    );
}

#[test]
fn test_extra_arguments_warning_comes_first() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let printed = run(&mut shell, "pcp please");
    assert_eq!(
        printed,
        "Warning: extra arguments please will be ignored.\nNo current project set.\n"
    );
}

#[test]
fn test_repeated_warning_renders_once() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    // Each repeat after the first warns with identical text
    let printed = run(&mut shell, "create p1 r --type c --type c --type c");
    let count = printed
        .lines()
        .filter(|line| line.starts_with("Warning: Flag --type given more than once"))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_script_runs_until_end_of_input() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let script = "create a r\ncreate b c\n\nlistproj\nexit\ncreate c r\n";
    shell.run(&mut ScriptSource::new(Cursor::new(script))).unwrap();

    let printed = String::from_utf8(shell.output().clone()).unwrap();
    assert!(printed.contains("Projects in use: [a, b]"));
    assert!(shell.session().store.get("c").is_none());
}

#[test]
fn test_help_lists_commands() {
    let ws = TestWorkspace::new();
    let mut shell = ws.shell();
    let printed = run(&mut shell, "help");
    for command in ["create", "runall", "pca", "config"] {
        assert!(printed.contains(command), "help is missing {}", command);
    }
    assert!(printed.ends_with("Note: Use help <command> for its arguments.\n"));

    let printed = run(&mut shell, "help tune");
    assert!(printed.contains("Usage: tune <model> [--n_values n] [--cv k]"));

    // The advertised form is the one the parser accepts
    assert!(run(&mut shell, "help read_data").contains("Usage: read_data [head]"));
    run(&mut shell, "create p1 r");
    assert_eq!(
        run(&mut shell, "read_data 5"),
        "Error: Project has no dataframe. Use add_data to add a dataframe.\n"
    );
}
