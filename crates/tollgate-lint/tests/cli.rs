//! Exit codes and output formats of the `tollgate-lint` binary.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const CLEAN: &str = r#"{"expression": "${x}", "predicates": [{"type": "empty"}]}"#;
const WARNS: &str = r#"{"expression": "${x}", "predicates": []}"#;
const BROKEN: &str = r#"{"predicates": [{"type": "regex", "pattern": "("}]}"#;

fn lint(args: &[&str]) -> (i32, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tollgate-lint"))
        .args(args)
        .output()
        .unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_clean_policy_exits_zero() {
    let dir = TempDir::new().unwrap();
    let clean = write(&dir, "clean.json", CLEAN);
    let (code, stdout) = lint(&[clean.as_str()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("All checks passed!"));
}

#[test]
fn test_warnings_fail_only_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    let warns = write(&dir, "warns.json", WARNS);
    assert_eq!(lint(&[warns.as_str()]).0, 0);
    assert_eq!(lint(&["--strict", warns.as_str()]).0, 1);
}

#[test]
fn test_errors_reported_as_json() {
    let dir = TempDir::new().unwrap();
    write(&dir, "clean.json", CLEAN);
    write(&dir, "broken.json", BROKEN);

    let (code, stdout) = lint(&["--format", "json", path_str(dir.path()).as_str()]);
    assert_eq!(code, 1);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["files_checked"], 2);
    assert_eq!(report["errors"], 2);
    let codes: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["E003", "E005"]);
}
