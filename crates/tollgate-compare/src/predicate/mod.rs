//! Predicate descriptors for comparison assertions.
//!
//! A comparison assertion holds an ordered chain of predicates applied to one
//! left-hand value. Three shapes exist:
//!
//! - `dataType` - not a test; coerces the working value(s) to a declared type
//! - `binary` - compares against a right-hand expression using an `Operator`
//! - kind-specific (`regex`, `stringLength`, `numericRange`, `cardinality`, `empty`) -
//!   each compiled into exactly one evaluator (see `crate::evaluator`)
//!
//! Every predicate except `dataType` carries a `negated` flag.

mod operator;

pub use operator::Operator;

use crate::value::DataType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One condition in a comparison assertion.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    DataType(DataTypePredicate),
    Binary(BinaryPredicate),
    Regex(RegexPredicate),
    StringLength(StringLengthPredicate),
    NumericRange(NumericRangePredicate),
    Cardinality(CardinalityPredicate),
    Empty(EmptyPredicate),
}

impl Predicate {
    /// Coerce the working value to `data_type`.
    pub fn data_type(data_type: DataType) -> Self {
        Predicate::DataType(DataTypePredicate { data_type })
    }

    /// Compare the working value against `right_value` (case-sensitive).
    pub fn binary(operator: Operator, right_value: impl Into<String>) -> Self {
        Predicate::Binary(BinaryPredicate {
            operator,
            right_value: right_value.into(),
            case_sensitive: true,
            negated: false,
        })
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Predicate::Regex(RegexPredicate {
            pattern: pattern.into(),
            case_sensitive: true,
            negated: false,
        })
    }

    pub fn string_length(min: usize, max: Option<usize>) -> Self {
        Predicate::StringLength(StringLengthPredicate {
            min,
            max,
            negated: false,
        })
    }

    pub fn numeric_range(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Predicate::NumericRange(NumericRangePredicate {
            min,
            max,
            negated: false,
        })
    }

    pub fn cardinality(min: usize, max: Option<usize>) -> Self {
        Predicate::Cardinality(CardinalityPredicate {
            min,
            max,
            negated: false,
        })
    }

    pub fn empty() -> Self {
        Predicate::Empty(EmptyPredicate { negated: false })
    }

    /// Return this predicate with its result inverted.
    ///
    /// `dataType` predicates cannot be negated and are returned unchanged.
    pub fn negate(mut self) -> Self {
        match &mut self {
            Predicate::DataType(_) => {}
            Predicate::Binary(p) => p.negated = !p.negated,
            Predicate::Regex(p) => p.negated = !p.negated,
            Predicate::StringLength(p) => p.negated = !p.negated,
            Predicate::NumericRange(p) => p.negated = !p.negated,
            Predicate::Cardinality(p) => p.negated = !p.negated,
            Predicate::Empty(p) => p.negated = !p.negated,
        }
        self
    }

    /// Make string comparison case-insensitive (binary and regex predicates).
    pub fn ignore_case(mut self) -> Self {
        match &mut self {
            Predicate::Binary(p) => p.case_sensitive = false,
            Predicate::Regex(p) => p.case_sensitive = false,
            _ => {}
        }
        self
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Predicate::DataType(_) => false,
            Predicate::Binary(p) => p.negated,
            Predicate::Regex(p) => p.negated,
            Predicate::StringLength(p) => p.negated,
            Predicate::NumericRange(p) => p.negated,
            Predicate::Cardinality(p) => p.negated,
            Predicate::Empty(p) => p.negated,
        }
    }

    /// Serialized `type` tag of this predicate.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::DataType(_) => "dataType",
            Predicate::Binary(_) => "binary",
            Predicate::Regex(_) => "regex",
            Predicate::StringLength(_) => "stringLength",
            Predicate::NumericRange(_) => "numericRange",
            Predicate::Cardinality(_) => "cardinality",
            Predicate::Empty(_) => "empty",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            f.write_str("NOT ")?;
        }
        match self {
            Predicate::DataType(p) => write!(f, "is of type {}", p.data_type),
            Predicate::Binary(p) => {
                f.write_str(p.operator.phrase())?;
                if !p.operator.is_unary() {
                    write!(f, " {}", p.right_value)?;
                }
                if !p.case_sensitive {
                    f.write_str(" (case-insensitive)")?;
                }
                Ok(())
            }
            Predicate::Regex(p) => {
                write!(f, "matches /{}/", p.pattern)?;
                if !p.case_sensitive {
                    f.write_str("i")?;
                }
                Ok(())
            }
            Predicate::StringLength(p) => write!(f, "has length {}", Bounds(&p.min, &p.max)),
            Predicate::NumericRange(p) => match (&p.min, &p.max) {
                (None, None) => f.write_str("is numeric"),
                (Some(min), max) => write!(f, "is a number {}", Bounds(min, max)),
                (None, Some(max)) => write!(f, "is a number at most {max}"),
            },
            Predicate::Cardinality(p) => write!(f, "has value count {}", Bounds(&p.min, &p.max)),
            Predicate::Empty(_) => f.write_str("is empty"),
        }
    }
}

/// Renders `min`/`max` bounds as "between a and b" or "at least a".
struct Bounds<'a, T>(&'a T, &'a Option<T>);

impl<T: fmt::Display> fmt::Display for Bounds<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(max) => write!(f, "between {} and {}", self.0, max),
            None => write!(f, "at least {}", self.0),
        }
    }
}

fn default_case_sensitive() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Coerce the working value(s) to `data_type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataTypePredicate {
    pub data_type: DataType,
}

/// Compare the working value against a right-hand expression.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BinaryPredicate {
    pub operator: Operator,
    /// Right-hand expression; may contain `${...}` references
    #[serde(default)]
    pub right_value: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}

/// String form of the value matches a regular expression (unanchored search).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegexPredicate {
    pub pattern: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}

/// Character count of the value's string form lies in `[min, max]`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StringLengthPredicate {
    #[serde(default)]
    pub min: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}

/// Value is numeric and lies in `[min, max]` (either bound optional).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NumericRangePredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}

/// Number of values lies in `[min, max]`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardinalityPredicate {
    #[serde(default)]
    pub min: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}

/// There are no values, or every value renders as an empty string.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyPredicate {
    #[serde(default, skip_serializing_if = "is_false")]
    pub negated: bool,
}
