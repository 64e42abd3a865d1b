//! Binary comparison of a working value against a right-hand expression.

use crate::config::EngineOptions;
use crate::error::VariableError;
use crate::predicate::BinaryPredicate;
use crate::value::Value;
use crate::variables::{self, VariableBindings};
use std::borrow::Cow;
use tracing::debug;

/// Compare `left` against the predicate's right-hand expression.
///
/// The right-hand expression is resolved as a single value. Operands without
/// a native ordering are compared through their string form. Negation is
/// left to the caller.
///
/// Quirk: when the right operand has no native ordering, its stand-in is the
/// *left* value's string form, not its own.
pub fn compare(
    left: &Value,
    predicate: &BinaryPredicate,
    bindings: &VariableBindings,
    options: &EngineOptions,
) -> Result<bool, VariableError> {
    let right = if predicate.operator.is_unary() {
        None
    } else {
        variables::resolve(&predicate.right_value, bindings, options)?
    };
    let right = right.unwrap_or_else(|| {
        if !predicate.operator.is_unary() {
            debug!(expression = %predicate.right_value, "Right value is null, comparing with empty string");
        }
        Value::String(String::new())
    });

    let comparable_left: Cow<'_, Value> = if left.is_comparable() {
        Cow::Borrowed(left)
    } else {
        debug!(
            value_type = left.type_name(),
            "Left value is not comparable, comparing its string form"
        );
        Cow::Owned(Value::String(left.to_string()))
    };

    let comparable_right: Cow<'_, Value> = if right.is_comparable() {
        Cow::Owned(right)
    } else {
        debug!(
            value_type = right.type_name(),
            "Right value is not comparable, comparing left value's string form"
        );
        Cow::Owned(Value::String(left.to_string()))
    };

    Ok(predicate.operator.compare(
        &comparable_left,
        &comparable_right,
        !predicate.case_sensitive,
    ))
}
