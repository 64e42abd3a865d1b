//! Loading policies and bindings from disk, and the `tollgate-compare` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::{NamedTempFile, TempDir};
use tollgate_compare::config::{load_bindings, PolicyFile};
use tollgate_compare::value::Value;
use tollgate_compare::{AssertionStatus, ComparisonAssertion};

const SIZE_POLICY: &str = r#"
expression: "${request.size}"
predicates:
  - type: dataType
    dataType: integer
  - type: binary
    operator: lessThanOrEqual
    rightValue: "${limits.max}"
options:
  strictVariables: false
"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn path(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn run_cli(args: &[&str]) -> (i32, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tollgate-compare"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

#[test]
fn test_yaml_policy_with_json_bindings() {
    let dir = TempDir::new().unwrap();
    let policy = write_file(&dir, "policy.yaml", SIZE_POLICY);
    let vars = write_file(
        &dir,
        "vars.json",
        r#"{"request": {"size": "512"}, "limits": {"max": 1024}}"#,
    );

    let file = PolicyFile::from_file(&policy).unwrap();
    let bindings = load_bindings(&vars).unwrap();
    assert_eq!(bindings.get("request.size"), Some(&Value::from("512")));

    let assertion = ComparisonAssertion::new(file.policy, file.options).unwrap();
    assert_eq!(assertion.check_request(&bindings), AssertionStatus::None);
}

#[test]
fn test_json_policy_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"expression": "${{roles}}", "predicates": [{{"type": "cardinality", "min": 1}}]}}"#
    )
    .unwrap();

    let policy = PolicyFile::from_file(file.path()).unwrap();
    assert_eq!(policy.policy.expression, "${roles}");
    assert!(!policy.options.strict_variables);
}

#[test]
fn test_invalid_range_rejected_at_load() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "expression: \"${{x}}\"\npredicates:\n  - type: stringLength\n    min: 5\n    max: 2"
    )
    .unwrap();

    let err = PolicyFile::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("greater than maximum"));
}

#[test]
fn test_bindings_must_be_object() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[1, 2, 3]").unwrap();
    assert!(load_bindings(file.path()).is_err());
}

#[test]
fn test_bindings_arrays_become_lists() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"scopes": ["a", "b"], "missing": null, "ratio": 0.5}}"#).unwrap();
    let bindings = load_bindings(file.path()).unwrap();

    assert_eq!(bindings.get("scopes"), Some(&Value::from(vec!["a", "b"])));
    assert_eq!(bindings.get("missing"), None);
    assert!(matches!(bindings.get("ratio"), Some(Value::Decimal(_))));
}

#[test]
fn test_cli_exit_codes() {
    let dir = TempDir::new().unwrap();
    let policy = write_file(&dir, "policy.yaml", SIZE_POLICY);
    let small = write_file(&dir, "small.json", r#"{"request.size": 10, "limits.max": 100}"#);
    let large = write_file(&dir, "large.json", r#"{"request.size": 1000, "limits.max": 100}"#);
    let absent = write_file(&dir, "absent.json", r#"{"limits.max": 100}"#);

    let (code, stdout) = run_cli(&["--policy", path(&policy), "--vars", path(&small)]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "PASS");

    let (code, stdout) = run_cli(&["--policy", path(&policy), "--vars", path(&large)]);
    assert_eq!(code, 1);
    assert_eq!(
        stdout.trim(),
        "FAIL at predicate #1: is less than or equal to ${limits.max}"
    );

    let (code, stdout) = run_cli(&["--policy", path(&policy), "--vars", path(&absent)]);
    assert_eq!(code, 1);
    assert_eq!(stdout.trim(), "NULL LEFT VALUE");
}

#[test]
fn test_cli_json_report() {
    let dir = TempDir::new().unwrap();
    let policy = write_file(&dir, "policy.yaml", SIZE_POLICY);
    let large = write_file(&dir, "large.json", r#"{"request.size": 1000, "limits.max": 100}"#);

    let (code, stdout) = run_cli(&[
        "--policy",
        path(&policy),
        "--vars",
        path(&large),
        "--json",
    ]);
    assert_eq!(code, 1);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["outcome"], "fail");
    assert_eq!(report["failedIndex"], 1);
    assert_eq!(report["evaluated"], 2);
}

#[test]
fn test_cli_config_error_exit_code() {
    let dir = TempDir::new().unwrap();
    let policy = write_file(
        &dir,
        "broken.yaml",
        "expression: \"${x}\"\npredicates:\n  - type: regex\n    pattern: \"(\"\n",
    );

    let (code, _) = run_cli(&["--policy", path(&policy)]);
    assert_eq!(code, 2);
}
