//! Issue and result types shared by the validator and the CLI.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity level of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The policy will be rejected when loaded, or fail at evaluation time.
    Error,
    /// The policy loads but probably does not do what was intended.
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Every issue the linter can report.
///
/// The letter of the rendered code carries the severity: `E` issues make the
/// policy fail to load or fail at evaluation time, `W` issues load but likely
/// misbehave, and `I` notes only show with `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    /// E001
    Unreadable,
    /// E002
    InvalidJson,
    /// E003: not an object, or no `expression`
    MissingExpression,
    /// E004: malformed predicate list or unknown `type`
    InvalidPredicate,
    /// E005
    InvalidRegex,
    /// E006: `min` greater than `max`
    InvertedBounds,
    /// E007: unknown data type or operator
    UnknownTypeOrOperator,
    /// E008: length or count bound that is not a non-negative integer
    InvalidCountBound,
    /// W001: more than one `dataType` predicate
    RepeatedDataType,
    /// W002: `rightValue` given to the unary `empty` operator
    UnaryRightValue,
    /// W003
    NoPredicates,
    /// W004: `binary` predicate without `rightValue`
    MissingRightValue,
    /// I001: expression is interpolated rather than a single reference
    InterpolatedExpression,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Unreadable => "E001",
            IssueCode::InvalidJson => "E002",
            IssueCode::MissingExpression => "E003",
            IssueCode::InvalidPredicate => "E004",
            IssueCode::InvalidRegex => "E005",
            IssueCode::InvertedBounds => "E006",
            IssueCode::UnknownTypeOrOperator => "E007",
            IssueCode::InvalidCountBound => "E008",
            IssueCode::RepeatedDataType => "W001",
            IssueCode::UnaryRightValue => "W002",
            IssueCode::NoPredicates => "W003",
            IssueCode::MissingRightValue => "W004",
            IssueCode::InterpolatedExpression => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self.as_str().as_bytes()[0] {
            b'E' => Severity::Error,
            b'W' => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single lint issue found in a policy document.
#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    /// Always `code.severity()`; serialized for JSON consumers
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    /// Path into the document, e.g. "predicates[2].pattern"
    pub location: Option<String>,
    /// One-line hint printed under the issue
    pub suggestion: Option<String>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl LintIssue {
    pub fn new(code: IssueCode, message: impl Into<String>, file: PathBuf) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            file,
            location: None,
            suggestion: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of linting one or more policy documents.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue, keeping the error and warning counters in step.
    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// No errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    /// Whether the run should fail, treating warnings as errors when `strict`.
    pub fn is_failure(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }

    /// Rendered codes in report order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    pub fn merge(&mut self, other: LintResult) {
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Options for validation.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Report informational issues as well
    pub verbose: bool,
}
