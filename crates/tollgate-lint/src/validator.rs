//! Core validation logic for comparison policy documents.

use crate::types::{IssueCode, LintIssue, LintOptions, LintResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;

const PREDICATE_TYPES: [&str; 7] = [
    "dataType",
    "binary",
    "regex",
    "stringLength",
    "numericRange",
    "cardinality",
    "empty",
];

const DATA_TYPES: [&str; 9] = [
    "string",
    "integer",
    "decimal",
    "float",
    "boolean",
    "dateTime",
    "certificate",
    "element",
    "message",
];

const OPERATORS: [&str; 14] = [
    "equals",
    "notEquals",
    "lessThan",
    "lessThanOrEqual",
    "greaterThan",
    "greaterThanOrEqual",
    "contains",
    "empty",
    "eq",
    "ne",
    "lt",
    "le",
    "gt",
    "ge",
];

/// Validate a complete policy document.
pub fn validate_policy(file: &Path, policy: &Value, result: &mut LintResult, options: &LintOptions) {
    let Some(obj) = policy.as_object() else {
        result.add_issue(
            LintIssue::new(
                IssueCode::MissingExpression,
                "Policy must be a JSON object",
                file.to_path_buf(),
            )
            .with_suggestion("Wrap the policy in { \"expression\": ..., \"predicates\": [...] }"),
        );
        return;
    };

    check_expression(file, obj, result, options);

    let predicates = match obj.get("predicates") {
        None => &[][..],
        Some(Value::Array(predicates)) => predicates.as_slice(),
        Some(_) => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::InvalidPredicate,
                    "'predicates' must be an array",
                    file.to_path_buf(),
                )
                .with_location("predicates"),
            );
            return;
        }
    };

    if predicates.is_empty() {
        result.add_issue(
            LintIssue::new(IssueCode::NoPredicates, "Policy has no predicates", file.to_path_buf())
                .with_location("predicates")
                .with_suggestion("Without predicates every bound value passes"),
        );
    }

    for (idx, predicate) in predicates.iter().enumerate() {
        validate_predicate(file, predicate, &format!("predicates[{idx}]"), result, options);
    }

    check_data_type_count(file, predicates, result);
}

fn check_expression(
    file: &Path,
    obj: &Map<String, Value>,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let expression = obj.get("expression").and_then(Value::as_str).map(str::trim);
    match expression {
        None | Some("") => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::MissingExpression,
                    "Missing required field: expression",
                    file.to_path_buf(),
                )
                .with_suggestion("Add \"expression\": \"${variable}\""),
            );
        }
        Some(expression) if options.verbose && !is_single_reference(expression) => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::InterpolatedExpression,
                    format!("Expression '{expression}' is interpolated into a string"),
                    file.to_path_buf(),
                )
                .with_location("expression")
                .with_suggestion("Use a single ${variable} reference to keep the value's type"),
            );
        }
        Some(_) => {}
    }
}

fn is_single_reference(expression: &str) -> bool {
    expression
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .is_some_and(|body| !body.contains('}'))
}

/// More than one `dataType` predicate is a runtime error for multi-valued variables.
fn check_data_type_count(file: &Path, predicates: &[Value], result: &mut LintResult) {
    let declared: Vec<usize> = predicates
        .iter()
        .enumerate()
        .filter(|(_, p)| p.get("type").and_then(Value::as_str) == Some("dataType"))
        .map(|(idx, _)| idx)
        .collect();

    if let [_, second, ..] = declared.as_slice() {
        result.add_issue(
            LintIssue::new(
                IssueCode::RepeatedDataType,
                format!("{} dataType predicates declared", declared.len()),
                file.to_path_buf(),
            )
            .with_location(format!("predicates[{second}]"))
            .with_suggestion("Multi-valued variables accept a single dataType declaration"),
        );
    }
}

/// Validate one predicate object.
pub fn validate_predicate(
    file: &Path,
    predicate: &Value,
    location: &str,
    result: &mut LintResult,
    _options: &LintOptions,
) {
    let Some(obj) = predicate.as_object() else {
        result.add_issue(
            LintIssue::new(
                IssueCode::InvalidPredicate,
                "Predicate must be an object",
                file.to_path_buf(),
            )
            .with_location(location),
        );
        return;
    };

    let Some(kind) = obj.get("type").and_then(Value::as_str) else {
        result.add_issue(
            LintIssue::new(IssueCode::InvalidPredicate, "Predicate has no type", file.to_path_buf())
                .with_location(location)
                .with_suggestion(format!("Add \"type\": one of {}", PREDICATE_TYPES.join(", "))),
        );
        return;
    };

    match kind {
        "dataType" => check_data_type(file, obj, location, result),
        "binary" => check_binary(file, obj, location, result),
        "regex" => check_regex(file, obj, location, result),
        "stringLength" | "cardinality" => {
            check_count_bounds(file, obj, location, result);
            check_bounds(file, obj, location, result)
        }
        "numericRange" => {
            check_bounds(file, obj, location, result)
        }
        "empty" => {}
        unknown => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::InvalidPredicate,
                    format!("Unknown predicate type: {unknown}"),
                    file.to_path_buf(),
                )
                .with_location(format!("{location}.type"))
                .with_suggestion(format!("Use one of: {}", PREDICATE_TYPES.join(", "))),
            );
        }
    }
}

fn check_data_type(file: &Path, obj: &Map<String, Value>, location: &str, result: &mut LintResult) {
    match obj.get("dataType").and_then(Value::as_str) {
        Some(data_type) if DATA_TYPES.contains(&data_type) => {}
        Some(data_type) => result.add_issue(
            LintIssue::new(
                IssueCode::UnknownTypeOrOperator,
                format!("Unknown data type: {data_type}"),
                file.to_path_buf(),
            )
            .with_location(format!("{location}.dataType"))
            .with_suggestion(format!("Use one of: {}", DATA_TYPES.join(", "))),
        ),
        None => result.add_issue(
            LintIssue::new(
                IssueCode::UnknownTypeOrOperator,
                "dataType predicate has no dataType",
                file.to_path_buf(),
            )
            .with_location(location),
        ),
    }
}

fn check_binary(file: &Path, obj: &Map<String, Value>, location: &str, result: &mut LintResult) {
    let operator = match obj.get("operator").and_then(Value::as_str) {
        Some(operator) if OPERATORS.contains(&operator) => operator,
        Some(operator) => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::UnknownTypeOrOperator,
                    format!("Unknown operator: {operator}"),
                    file.to_path_buf(),
                )
                .with_location(format!("{location}.operator"))
                .with_suggestion(format!("Use one of: {}", OPERATORS[..8].join(", "))),
            );
            return;
        }
        None => {
            result.add_issue(
                LintIssue::new(
                    IssueCode::UnknownTypeOrOperator,
                    "binary predicate has no operator",
                    file.to_path_buf(),
                )
                .with_location(location),
            );
            return;
        }
    };

    let has_right_value = obj.get("rightValue").is_some_and(|v| !v.is_null());
    if operator == "empty" && has_right_value {
        result.add_issue(
            LintIssue::new(
                IssueCode::UnaryRightValue,
                "rightValue is ignored by the empty operator",
                file.to_path_buf(),
            )
            .with_location(format!("{location}.rightValue")),
        );
    } else if operator != "empty" && !has_right_value {
        result.add_issue(
            LintIssue::new(
                IssueCode::MissingRightValue,
                format!("'{operator}' has no rightValue and compares against an empty string"),
                file.to_path_buf(),
            )
            .with_location(location),
        );
    }
}

fn check_regex(file: &Path, obj: &Map<String, Value>, location: &str, result: &mut LintResult) {
    let Some(pattern) = obj.get("pattern").and_then(Value::as_str) else {
        result.add_issue(
            LintIssue::new(
                IssueCode::InvalidRegex,
                "regex predicate has no pattern",
                file.to_path_buf(),
            )
            .with_location(location),
        );
        return;
    };

    if let Err(e) = Regex::new(pattern) {
        result.add_issue(
            LintIssue::new(
                IssueCode::InvalidRegex,
                format!("Invalid regex pattern: {e}"),
                file.to_path_buf(),
            )
            .with_location(format!("{location}.pattern"))
            .with_suggestion("Check regex syntax"),
        );
    }
}

fn check_bounds(file: &Path, obj: &Map<String, Value>, location: &str, result: &mut LintResult) {
    let (Some(min), Some(max)) = (bound(obj.get("min")), bound(obj.get("max"))) else {
        return;
    };
    if min > max {
        result.add_issue(
            LintIssue::new(
                IssueCode::InvertedBounds,
                format!("Minimum {min} is greater than maximum {max}"),
                file.to_path_buf(),
            )
            .with_location(location)
            .with_suggestion("Swap the bounds or drop one of them"),
        );
    }
}

/// Length and count bounds load as unsigned integers; strings and fractions
/// are rejected by the engine.
fn check_count_bounds(
    file: &Path,
    obj: &Map<String, Value>,
    location: &str,
    result: &mut LintResult,
) {
    for key in ["min", "max"] {
        let valid = match obj.get(key) {
            None => true,
            Some(Value::Null) => key == "max",
            Some(value) => value.as_u64().is_some(),
        };
        if !valid {
            result.add_issue(
                LintIssue::new(
                    IssueCode::InvalidCountBound,
                    format!("Bound '{key}' must be a non-negative integer"),
                    file.to_path_buf(),
                )
                .with_location(format!("{location}.{key}")),
            );
        }
    }
}

/// Numeric bound given as a JSON number or a numeric string.
fn bound(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
