//! Evaluators that test one value at a time.

use crate::value::Value;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

/// Compiled evaluator for a predicate that understands only single values.
///
/// Applied to a multi-valued working set, the state machine broadcasts it over
/// every element and requires all of them to pass.
#[derive(Debug, Clone)]
pub enum SingleValuedEvaluator {
    /// Unanchored regex search over the string form
    Regex(Arc<Regex>),
    /// Character count of the string form within bounds
    StringLength { min: usize, max: Option<usize> },
    /// Numeric value within bounds
    NumericRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
}

impl SingleValuedEvaluator {
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            SingleValuedEvaluator::Regex(regex) => regex.is_match(&value.to_string()),
            SingleValuedEvaluator::StringLength { min, max } => {
                let len = value.to_string().chars().count();
                len >= *min && max.is_none_or(|max| len <= max)
            }
            SingleValuedEvaluator::NumericRange { min, max } => match numeric(value) {
                Some(Number::Exact(n)) => {
                    min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
                }
                Some(Number::Approx(x)) => {
                    min.is_none_or(|min| min.to_f64().is_some_and(|min| x >= min))
                        && max.is_none_or(|max| max.to_f64().is_some_and(|max| x <= max))
                }
                None => false,
            },
        }
    }
}

/// Numeric reading of a value.
enum Number {
    Exact(Decimal),
    /// Finite, but outside what `Decimal` can hold
    Approx(f64),
}

fn finite(x: f64) -> Option<Number> {
    x.is_finite().then_some(Number::Approx(x))
}

/// Numeric reading of a value, if it has one.
fn numeric(value: &Value) -> Option<Number> {
    match value {
        Value::Integer(i) => Some(Number::Exact(Decimal::from(*i))),
        Value::Decimal(d) => Some(Number::Exact(*d)),
        Value::Float(x) => match Decimal::try_from(*x) {
            Ok(d) => Some(Number::Exact(d)),
            Err(_) => finite(*x),
        },
        Value::String(_) | Value::Message(_) => {
            let text = value.to_string();
            let trimmed = text.trim();
            match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
                Ok(d) => Some(Number::Exact(d)),
                Err(_) => trimmed.parse::<f64>().ok().and_then(finite),
            }
        }
        _ => None,
    }
}
