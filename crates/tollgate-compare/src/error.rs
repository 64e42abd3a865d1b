//! Error types for the comparison engine.
//!
//! Recoverable data conditions (a value that will not convert, a predicate
//! that does not hold) are never errors: they fold into the evaluation
//! outcome. The types here cover the other two classes:
//!
//! - `ConfigError` - a policy that cannot be compiled (bad regex, inverted range)
//! - `EvaluationError` - a policy the state machine cannot execute consistently

use crate::value::DataType;
use thiserror::Error;

/// Why a single value could not be coerced to a data type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("cannot parse {value:?} as {data_type}")]
    Unparseable { data_type: DataType, value: String },

    #[error("no conversion from {from} to {to}")]
    Unsupported { from: &'static str, to: DataType },
}

/// Errors raised while compiling a policy into evaluators.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("predicate #{index}: invalid regex: {source}")]
    InvalidRegex {
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("predicate #{index}: minimum {min} is greater than maximum {max}")]
    InvalidRange {
        index: usize,
        min: String,
        max: String,
    },

    #[error("comparison expression is empty")]
    MissingExpression,

    #[error("failed to parse policy: {0}")]
    Parse(String),
}

/// Errors raised while expanding variable references.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    #[error("invalid subscript {subscript:?} on variable {name}")]
    InvalidSubscript { name: String, subscript: String },

    #[error("no such variable: {0}")]
    Unbound(String),

    #[error("subscript {index} out of range for variable {name} ({len} values)")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

/// Unrecoverable evaluation errors: the policy is inconsistent with itself.
///
/// These are never reported as an ordinary predicate failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvaluationError {
    #[error("predicate #{index} has no registered evaluator")]
    MissingEvaluator { index: usize },

    #[error("element type already declared as {declared}, cannot redeclare as {requested}")]
    DataTypeAlreadyDeclared {
        declared: DataType,
        requested: DataType,
    },

    #[error(transparent)]
    Variable(#[from] VariableError),
}
