//! Policy linting library for Tollgate comparison assertions.
//!
//! Checks comparison policy documents (JSON) for problems that would make the
//! policy fail to load, fail at evaluation time, or silently misbehave. It can
//! be used as a library or through the `tollgate-lint` CLI binary.
//!
//! # Example
//!
//! ```no_run
//! use tollgate_lint::{lint_directory, lint_file, LintOptions};
//! use std::path::Path;
//!
//! let result = lint_file(Path::new("policy.json"), &LintOptions::default());
//! let result = lint_directory(Path::new("./policies"), &LintOptions::default());
//!
//! if result.has_errors() {
//!     eprintln!("Found {} errors", result.errors);
//! }
//! ```

mod types;
mod validator;

use std::path::Path;

pub use types::{IssueCode, LintIssue, LintOptions, LintResult, Severity};
pub use validator::{validate_policy, validate_predicate};

/// Lint a single policy file.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_issue(LintIssue::new(
                IssueCode::Unreadable,
                format!("Failed to read file: {e}"),
                path.to_path_buf(),
            ));
            return result;
        }
    };

    lint_content(&content, path, options, result)
}

/// Lint all JSON files in a directory (non-recursive).
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();

    let entries = match std::fs::read_dir(path) {
        Ok(e) => e,
        Err(e) => {
            result.add_issue(LintIssue::new(
                IssueCode::Unreadable,
                format!("Failed to read directory: {e}"),
                path.to_path_buf(),
            ));
            return result;
        }
    };

    let mut files: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    for file in files {
        result.merge(lint_file(&file, options));
    }
    result
}

/// Lint a file or every JSON file of a directory.
pub fn lint_path(path: &Path, options: &LintOptions) -> LintResult {
    if path.is_dir() {
        lint_directory(path, options)
    } else {
        lint_file(path, options)
    }
}

/// Lint a JSON string directly (useful for in-memory validation).
pub fn lint_json(json: &str, source_name: &str, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;
    lint_content(json, Path::new(source_name), options, result)
}

/// Lint an already parsed policy document.
pub fn lint_value(
    value: &serde_json::Value,
    source_name: &str,
    options: &LintOptions,
) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;
    validate_policy(Path::new(source_name), value, &mut result, options);
    result
}

fn lint_content(
    content: &str,
    path: &Path,
    options: &LintOptions,
    mut result: LintResult,
) -> LintResult {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => validate_policy(path, &value, &mut result, options),
        Err(e) => result.add_issue(
            LintIssue::new(IssueCode::InvalidJson, format!("Invalid JSON: {e}"), path.to_path_buf())
                .with_suggestion("Check for JSON syntax errors"),
        ),
    }
    result
}
