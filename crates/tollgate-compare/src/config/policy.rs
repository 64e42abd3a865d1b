//! Comparison policy documents.

use crate::error::ConfigError;
use crate::evaluator::EvaluatorSet;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// A left-hand expression and the ordered predicates applied to it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPolicy {
    /// Left-hand expression, usually a single `${variable}` reference
    pub expression: String,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

impl ComparisonPolicy {
    pub fn new(expression: impl Into<String>, predicates: Vec<Predicate>) -> Self {
        Self {
            expression: expression.into(),
            predicates,
        }
    }

    /// Validate the policy and compile its evaluators.
    pub fn compile(&self) -> Result<EvaluatorSet, ConfigError> {
        if self.expression.trim().is_empty() {
            return Err(ConfigError::MissingExpression);
        }
        EvaluatorSet::build(&self.predicates)
    }
}
