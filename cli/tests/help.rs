mod common;
use common::run_mcpgen;

#[test]
fn test_top_level_help() {
    let output = run_mcpgen(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: mcpgen"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("create"));
    assert!(stdout.contains("--debug"));
    assert!(stdout.contains("--config"));
}

#[test]
fn test_no_arguments_prints_help() {
    let output = run_mcpgen(&[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: mcpgen"));
}

#[test]
fn test_create_help_lists_options() {
    let output = run_mcpgen(&["create", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--name"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("<CAPTURE>"));
}

#[test]
fn test_version() {
    let output = run_mcpgen(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("mcpgen "));
}

#[test]
fn test_invalid_name_is_rejected() {
    let output = run_mcpgen(&["create", "tests/analyze/input/canvas_bearer.har", "--name", "../escape"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Name must match"));
}
