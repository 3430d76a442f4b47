mod common;
use common::{run_mcpgen, scratch_dir};
use std::fs;

#[test]
fn test_missing_capture_is_file_error() {
    let output = run_mcpgen(&["analyze", "tests/analyze/input/does_not_exist.har"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: File error:"), "stderr: {stderr}");
}

#[test]
fn test_not_a_har_document_is_capture_error() {
    let dir = scratch_dir("errors_not_har");
    let capture = dir.join("page.har");
    fs::write(&capture, "<html>not a capture</html>").unwrap();

    let output = run_mcpgen(&["analyze", &capture.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Capture format error"), "stderr: {stderr}");
}

#[test]
fn test_json_without_entries_is_capture_error() {
    let dir = scratch_dir("errors_no_entries");
    let capture = dir.join("empty.har");
    fs::write(&capture, r#"{"log": {"version": "1.2"}}"#).unwrap();

    let output = run_mcpgen(&["create", &capture.to_string_lossy(), "--output", &dir.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_settings_is_config_error() {
    let dir = scratch_dir("errors_settings");
    let settings = dir.join("settings.json");
    fs::write(&settings, r#"{"classifier": {"coverage_threshold": 3}}"#).unwrap();

    let output = run_mcpgen(&[
        "--config",
        &settings.to_string_lossy(),
        "analyze",
        "tests/analyze/input/canvas_bearer.har",
    ]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("coverage_threshold"), "stderr: {stderr}");
}

#[test]
fn test_settings_change_heuristics() {
    let dir = scratch_dir("errors_settings_ok");
    let settings = dir.join("settings.json");
    fs::write(&settings, r#"{"segments": {"extra_patterns": ["^modules$"]}}"#).unwrap();

    let output = run_mcpgen(&[
        "analyze",
        "tests/analyze/input/canvas_bearer.har",
        "-c",
        &settings.to_string_lossy(),
        "-f",
        "json",
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<&str> = report["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/v1/courses/{id}/{id_1}/{id_2}/items"), "{paths:?}");
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let output = run_mcpgen(&["--bogus"]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--bogus"), "stderr: {stderr}");
    assert!(!stderr.contains("Capture format error"), "stderr: {stderr}");
}
