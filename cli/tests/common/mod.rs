#![allow(dead_code)]
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn mcpgen_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mcpgen"))
}

/// Runs mcpgen with a quiet logger so stderr only carries errors.
pub fn run_mcpgen(args: &[&str]) -> Output {
    mcpgen_cmd()
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute mcpgen")
}

/// Fresh directory under the target tmpdir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

pub fn json_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(exp_map), Value::Object(act_map)) => {
            for (k, v) in exp_map {
                if let Some(act_v) = act_map.get(k) {
                    if !json_subset(v, act_v) {
                        return false;
                    }
                } else {
                    return false; // Key missing in actual
                }
            }
            true
        }
        (Value::Array(exp_arr), Value::Array(act_arr)) => {
            if exp_arr.len() != act_arr.len() {
                return false;
            }
            for (e, a) in exp_arr.iter().zip(act_arr.iter()) {
                if !json_subset(e, a) {
                    return false;
                }
            }
            true
        }
        (Value::String(s), _) if s == "{{*}}" => true,
        (Value::String(s), Value::String(a)) if s.starts_with("{{regex:") && s.ends_with("}}") => {
            let pattern = &s[8..s.len() - 2];
            if let Ok(re) = regex::Regex::new(pattern) {
                re.is_match(a)
            } else {
                false
            }
        }
        _ => expected == actual,
    }
}

pub fn validate_pure_json_response(stdout: &str, expected_path: &Path) -> Result<(), String> {
    let expected_content = fs::read_to_string(expected_path)
        .map_err(|e| format!("Failed to read expected file: {e}"))?;
    let expected_json: Value = serde_json::from_str(&expected_content)
        .map_err(|e| format!("Failed to parse expected JSON: {e}"))?;
    let actual_json: Value = serde_json::from_str(stdout)
        .map_err(|e| format!("Failed to parse actual JSON response: {e}"))?;

    if !json_subset(&expected_json, &actual_json) {
        return Err(format!(
            "JSON mismatch!\nExpected subset:\n{}\nActual:\n{}",
            serde_json::to_string_pretty(&expected_json).unwrap(),
            serde_json::to_string_pretty(&actual_json).unwrap()
        ));
    }

    Ok(())
}

/// Every file under `root`, as sorted `/`-separated relative paths.
pub fn list_files(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
