//! Binary comparison operators.

use crate::value::{convert::try_convert, DataType, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Operator applied by a `binary` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    #[serde(alias = "eq")]
    Equals,
    #[serde(alias = "ne")]
    NotEquals,
    #[serde(alias = "lt")]
    LessThan,
    #[serde(alias = "le")]
    LessThanOrEqual,
    #[serde(alias = "gt")]
    GreaterThan,
    #[serde(alias = "ge")]
    GreaterThanOrEqual,
    Contains,
    /// Unary: the right operand is ignored
    Empty,
}

/// Outcome of ordering two operands natively.
enum Order {
    Known(Ordering),
    /// Float comparison involving NaN
    Unordered,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::LessThan => "lessThan",
            Operator::LessThanOrEqual => "lessThanOrEqual",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::Contains => "contains",
            Operator::Empty => "empty",
        }
    }

    /// Phrase used in predicate descriptions.
    pub fn phrase(&self) -> &'static str {
        match self {
            Operator::Equals => "is equal to",
            Operator::NotEquals => "is not equal to",
            Operator::LessThan => "is less than",
            Operator::LessThanOrEqual => "is less than or equal to",
            Operator::GreaterThan => "is greater than",
            Operator::GreaterThanOrEqual => "is greater than or equal to",
            Operator::Contains => "contains",
            Operator::Empty => "is empty",
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Empty)
    }

    /// Compare two operands.
    ///
    /// Operands of the same kind compare natively (integers, decimals and
    /// floats compare numerically with each other). Otherwise the right operand
    /// is coerced to the left operand's type; a numeric left operand also
    /// accepts a right operand that reads as a decimal or a float. When all of
    /// that fails both sides are compared as strings.
    pub fn compare(&self, left: &Value, right: &Value, ignore_case: bool) -> bool {
        match self {
            Operator::Empty => left.to_string().is_empty(),
            Operator::Contains => {
                let (haystack, needle) = (left.to_string(), right.to_string());
                if ignore_case {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                } else {
                    haystack.contains(&needle)
                }
            }
            _ => match order(left, right, ignore_case) {
                Order::Known(ordering) => self.holds_for(ordering),
                Order::Unordered => *self == Operator::NotEquals,
            },
        }
    }

    fn holds_for(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equals => ordering == Ordering::Equal,
            Operator::NotEquals => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
            Operator::Contains | Operator::Empty => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn order(left: &Value, right: &Value, ignore_case: bool) -> Order {
    if let Some(order) = native_order(left, right, ignore_case) {
        return order;
    }

    let aligned = left
        .data_type()
        .and_then(|target| try_convert(right, target).ok());
    if let Some(order) = aligned.and_then(|r| native_order(left, &r, ignore_case)) {
        return order;
    }

    if matches!(left, Value::Integer(_) | Value::Decimal(_) | Value::Float(_)) {
        let widened = [DataType::Decimal, DataType::Float]
            .into_iter()
            .find_map(|target| try_convert(right, target).ok());
        if let Some(order) = widened.and_then(|r| native_order(left, &r, ignore_case)) {
            return order;
        }
    }

    Order::Known(text_order(&left.to_string(), &right.to_string(), ignore_case))
}

fn text_order(left: &str, right: &str, ignore_case: bool) -> Ordering {
    if ignore_case {
        left.to_lowercase().cmp(&right.to_lowercase())
    } else {
        left.cmp(right)
    }
}

fn float_order(left: f64, right: f64) -> Order {
    left.partial_cmp(&right)
        .map_or(Order::Unordered, Order::Known)
}

fn decimal_float_order(d: &Decimal, x: f64) -> Order {
    match d.to_f64() {
        Some(d) => float_order(d, x),
        None => Order::Unordered,
    }
}

/// Order two operands of compatible kinds; `None` when the kinds differ.
fn native_order(left: &Value, right: &Value, ignore_case: bool) -> Option<Order> {
    let order = match (left, right) {
        (Value::String(l), Value::String(r)) => Order::Known(text_order(l, r, ignore_case)),
        (Value::Integer(l), Value::Integer(r)) => Order::Known(l.cmp(r)),
        (Value::Decimal(l), Value::Decimal(r)) => Order::Known(l.cmp(r)),
        (Value::Float(l), Value::Float(r)) => float_order(*l, *r),
        (Value::Integer(l), Value::Decimal(r)) => Order::Known(Decimal::from(*l).cmp(r)),
        (Value::Decimal(l), Value::Integer(r)) => Order::Known(l.cmp(&Decimal::from(*r))),
        (Value::Integer(l), Value::Float(r)) => float_order(*l as f64, *r),
        (Value::Float(l), Value::Integer(r)) => float_order(*l, *r as f64),
        (Value::Decimal(l), Value::Float(r)) => decimal_float_order(l, *r),
        (Value::Float(l), Value::Decimal(r)) => match decimal_float_order(r, *l) {
            Order::Known(ordering) => Order::Known(ordering.reverse()),
            Order::Unordered => Order::Unordered,
        },
        (Value::Boolean(l), Value::Boolean(r)) => Order::Known(l.cmp(r)),
        (Value::DateTime(l), Value::DateTime(r)) => Order::Known(l.cmp(r)),
        _ => return None,
    };
    Some(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ordering() {
        let five = Value::Integer(5);
        let three = Value::Integer(3);
        assert!(Operator::GreaterThan.compare(&five, &three, false));
        assert!(Operator::GreaterThanOrEqual.compare(&five, &five, false));
        assert!(!Operator::LessThan.compare(&five, &three, false));
        assert!(Operator::NotEquals.compare(&five, &three, false));
    }

    #[test]
    fn test_right_operand_coerced_to_left_type() {
        // "10" > "9" is false as text, true as integers
        assert!(Operator::GreaterThan.compare(&Value::Integer(10), &Value::from("9"), false));
        assert!(Operator::Equals.compare(&Value::Integer(3), &Value::from(" 3 "), false));
    }

    #[test]
    fn test_falls_back_to_text_when_coercion_fails() {
        // "5" vs "abc" as text: '5' (0x35) sorts before 'a'
        assert!(Operator::LessThan.compare(&Value::Integer(5), &Value::from("abc"), false));
        assert!(!Operator::Equals.compare(&Value::Integer(5), &Value::from("abc"), false));
    }

    #[test]
    fn test_mixed_numeric_kinds() {
        let dec = Value::Decimal(Decimal::new(25, 1));
        assert!(Operator::GreaterThan.compare(&dec, &Value::Integer(2), false));
        assert!(Operator::LessThan.compare(&Value::Float(2.4), &dec, false));
        assert!(Operator::Equals.compare(&Value::Integer(2), &Value::Float(2.0), false));
    }

    #[test]
    fn test_numeric_left_widens_right_operand() {
        assert!(Operator::GreaterThan.compare(&Value::Integer(10), &Value::from("2.5"), false));
        assert!(!Operator::LessThan.compare(&Value::Integer(100), &Value::from("20.5"), false));
        assert!(Operator::LessThan.compare(&Value::Integer(3), &Value::from("1e30"), false));
        assert!(Operator::GreaterThan.compare(
            &Value::Decimal(Decimal::new(25, 1)),
            &Value::from("2.4999"),
            false
        ));
        // still text order when the right operand is not a number at all
        assert!(Operator::LessThan.compare(&Value::Integer(5), &Value::from("abc"), false));
    }

    #[test]
    fn test_nan_is_unordered() {
        let nan = Value::Float(f64::NAN);
        assert!(!Operator::Equals.compare(&nan, &nan, false));
        assert!(!Operator::LessThan.compare(&nan, &Value::Float(1.0), false));
        assert!(Operator::NotEquals.compare(&nan, &nan, false));
    }

    #[test]
    fn test_string_case_sensitivity() {
        let left = Value::from("Hello");
        let right = Value::from("hello");
        assert!(!Operator::Equals.compare(&left, &right, false));
        assert!(Operator::Equals.compare(&left, &right, true));
        assert!(Operator::LessThan.compare(&left, &right, false)); // 'H' < 'h'
    }

    #[test]
    fn test_contains() {
        let left = Value::from("/API/v1/users");
        assert!(Operator::Contains.compare(&left, &Value::from("v1"), false));
        assert!(!Operator::Contains.compare(&left, &Value::from("api"), false));
        assert!(Operator::Contains.compare(&left, &Value::from("api"), true));
        assert!(Operator::Contains.compare(&Value::Integer(12345), &Value::Integer(234), false));
    }

    #[test]
    fn test_empty_is_unary() {
        assert!(Operator::Empty.is_unary());
        assert!(Operator::Empty.compare(&Value::from(""), &Value::from("ignored"), false));
        assert!(!Operator::Empty.compare(&Value::from(" "), &Value::from(""), false));
    }

    #[test]
    fn test_boolean_and_date_ordering() {
        assert!(Operator::Equals.compare(&Value::Boolean(true), &Value::from("TRUE"), false));
        let earlier = Value::from("2024-01-01T00:00:00Z");
        let later = crate::value::convert::try_convert(
            &Value::from("2024-06-01T00:00:00Z"),
            crate::value::DataType::DateTime,
        )
        .unwrap();
        assert!(Operator::GreaterThan.compare(&later, &earlier, false));
    }

    #[test]
    fn test_operator_serde_aliases() {
        let op: Operator = serde_json::from_str(r#""gt""#).unwrap();
        assert_eq!(op, Operator::GreaterThan);
        let op: Operator = serde_json::from_str(r#""lessThanOrEqual""#).unwrap();
        assert_eq!(op, Operator::LessThanOrEqual);
        assert_eq!(serde_json::to_string(&Operator::NotEquals).unwrap(), r#""notEquals""#);
    }
}
