//! Evaluators that judge a whole sequence of values at once.

use crate::value::Value;

/// Compiled evaluator for a predicate defined over the whole value set.
///
/// The "whole" semantics belong to each variant; the state machine never
/// reinterprets them. A scalar working value is presented as a one-element
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiValuedEvaluator {
    /// Number of values within bounds
    Cardinality { min: usize, max: Option<usize> },
    /// No values at all, or only values rendering as ""
    Empty,
}

impl MultiValuedEvaluator {
    pub fn evaluate(&self, values: &[Value]) -> bool {
        match self {
            MultiValuedEvaluator::Cardinality { min, max } => {
                let count = values.len();
                count >= *min && max.is_none_or(|max| count <= max)
            }
            MultiValuedEvaluator::Empty => values.iter().all(|v| v.to_string().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality() {
        let evaluator = MultiValuedEvaluator::Cardinality {
            min: 1,
            max: Some(2),
        };
        assert!(!evaluator.evaluate(&[]));
        assert!(evaluator.evaluate(&[Value::from("a")]));
        assert!(evaluator.evaluate(&[Value::from("a"), Value::from("b")]));
        assert!(!evaluator.evaluate(&[Value::from("a"), Value::from("b"), Value::from("c")]));
    }

    #[test]
    fn test_empty() {
        assert!(MultiValuedEvaluator::Empty.evaluate(&[]));
        assert!(MultiValuedEvaluator::Empty.evaluate(&[Value::from(""), Value::from("")]));
        assert!(!MultiValuedEvaluator::Empty.evaluate(&[Value::from(""), Value::from("x")]));
    }
}
