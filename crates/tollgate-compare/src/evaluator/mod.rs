//! Compiled evaluators for kind-specific predicates.
//!
//! Each kind-specific predicate compiles into exactly one `Evaluator`, which
//! is either single-valued or multi-valued. `dataType` and `binary`
//! predicates have no evaluator: the state machine handles them directly.
//!
//! An `EvaluatorSet` is built once per assertion and only read afterwards,
//! so it can be shared across concurrent evaluations.

mod multi;
mod single;

pub use multi::MultiValuedEvaluator;
pub use single::SingleValuedEvaluator;

use crate::error::ConfigError;
use crate::predicate::Predicate;
use regex::RegexBuilder;
use std::fmt::Display;
use std::sync::Arc;

/// Capability shape of a compiled evaluator.
#[derive(Debug, Clone)]
pub enum Evaluator {
    Single(SingleValuedEvaluator),
    Multi(MultiValuedEvaluator),
}

impl Evaluator {
    /// Compile the evaluator for a kind-specific predicate.
    ///
    /// Returns `Ok(None)` for `dataType` and `binary` predicates.
    pub fn compile(index: usize, predicate: &Predicate) -> Result<Option<Self>, ConfigError> {
        let evaluator = match predicate {
            Predicate::DataType(_) | Predicate::Binary(_) => return Ok(None),
            Predicate::Regex(p) => {
                let regex = RegexBuilder::new(&p.pattern)
                    .case_insensitive(!p.case_sensitive)
                    .build()
                    .map_err(|source| ConfigError::InvalidRegex { index, source })?;
                Evaluator::Single(SingleValuedEvaluator::Regex(Arc::new(regex)))
            }
            Predicate::StringLength(p) => {
                check_range(index, &Some(p.min), &p.max)?;
                Evaluator::Single(SingleValuedEvaluator::StringLength {
                    min: p.min,
                    max: p.max,
                })
            }
            Predicate::NumericRange(p) => {
                check_range(index, &p.min, &p.max)?;
                Evaluator::Single(SingleValuedEvaluator::NumericRange {
                    min: p.min,
                    max: p.max,
                })
            }
            Predicate::Cardinality(p) => {
                check_range(index, &Some(p.min), &p.max)?;
                Evaluator::Multi(MultiValuedEvaluator::Cardinality {
                    min: p.min,
                    max: p.max,
                })
            }
            Predicate::Empty(_) => Evaluator::Multi(MultiValuedEvaluator::Empty),
        };
        Ok(Some(evaluator))
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Evaluator::Multi(_))
    }
}

fn check_range<T: PartialOrd + Display>(
    index: usize,
    min: &Option<T>,
    max: &Option<T>,
) -> Result<(), ConfigError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ConfigError::InvalidRange {
            index,
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Evaluators for one predicate chain, keyed by predicate position.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorSet {
    evaluators: Vec<Option<Evaluator>>,
}

impl EvaluatorSet {
    /// Compile evaluators for every kind-specific predicate in `predicates`.
    pub fn build(predicates: &[Predicate]) -> Result<Self, ConfigError> {
        let evaluators = predicates
            .iter()
            .enumerate()
            .map(|(index, predicate)| Evaluator::compile(index, predicate))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { evaluators })
    }

    /// Evaluator registered for the predicate at `index`.
    pub fn get(&self, index: usize) -> Option<&Evaluator> {
        self.evaluators.get(index).and_then(Option::as_ref)
    }

    /// Number of registered evaluators.
    pub fn len(&self) -> usize {
        self.evaluators.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Operator;
    use crate::value::{DataType, Value};
    use rust_decimal::Decimal;

    #[test]
    fn test_binary_and_data_type_have_no_evaluator() {
        let predicates = vec![
            Predicate::data_type(DataType::Integer),
            Predicate::binary(Operator::Equals, "1"),
            Predicate::regex("^1$"),
        ];
        let set = EvaluatorSet::build(&predicates).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get(0).is_none());
        assert!(set.get(1).is_none());
        assert!(matches!(set.get(2), Some(Evaluator::Single(_))));
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_capability_shapes() {
        let predicates = vec![
            Predicate::string_length(0, None),
            Predicate::numeric_range(None, None),
            Predicate::cardinality(1, None),
            Predicate::empty(),
        ];
        let set = EvaluatorSet::build(&predicates).unwrap();
        assert!(!set.get(0).unwrap().is_multi_valued());
        assert!(!set.get(1).unwrap().is_multi_valued());
        assert!(set.get(2).unwrap().is_multi_valued());
        assert!(set.get(3).unwrap().is_multi_valued());
    }

    #[test]
    fn test_case_insensitive_regex() {
        let set = EvaluatorSet::build(&[Predicate::regex("^abc$").ignore_case()]).unwrap();
        match set.get(0) {
            Some(Evaluator::Single(evaluator)) => assert!(evaluator.evaluate(&Value::from("ABC"))),
            other => panic!("unexpected evaluator {other:?}"),
        }
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let err = EvaluatorSet::build(&[Predicate::empty(), Predicate::regex("(unclosed")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { index: 1, .. }));
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let err = EvaluatorSet::build(&[Predicate::string_length(5, Some(2))]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { index: 0, .. }));

        let err = EvaluatorSet::build(&[Predicate::numeric_range(
            Some(Decimal::from(10)),
            Some(Decimal::from(1)),
        )])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "predicate #0: minimum 10 is greater than maximum 1"
        );
    }
}
