//! Comparison orchestration and the policy-assertion boundary.
//!
//! `ComparisonAssertion` compiles its evaluators once and can then serve any
//! number of concurrent evaluations. Each evaluation resolves the left-hand
//! expression, picks a state variant, and walks the predicate chain in order,
//! stopping after the first predicate that leaves the running result false.

use crate::config::{ComparisonPolicy, EngineOptions};
use crate::error::{ConfigError, EvaluationError};
use crate::evaluator::EvaluatorSet;
use crate::predicate::Predicate;
use crate::state::{Context, State};
use crate::value::Value;
use crate::variables::{self, VariableBindings};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info};

/// Result of one evaluation of a predicate chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every predicate held (or there were none)
    Pass,
    /// The predicate at `index` left the running result false
    Fail { index: usize, predicate: Predicate },
    /// The left-hand expression resolved to nothing
    NullLeftValue,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("PASS"),
            Outcome::Fail { index, predicate } => {
                write!(f, "FAIL at predicate #{index}: {predicate}")
            }
            Outcome::NullLeftValue => f.write_str("NULL LEFT VALUE"),
        }
    }
}

/// An outcome plus what the run looked like when it stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// Number of predicates the state machine processed
    pub evaluated: usize,
    /// Working value when the run stopped (`Value::List` for multi-valued runs)
    pub value: Option<Value>,
}

/// Status reported to the surrounding policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionStatus {
    /// Assertion succeeded
    None,
    /// A predicate did not hold
    Falsified,
    /// The left-hand value was null
    Failed,
    /// The assertion is misconfigured
    ServerError,
}

/// Evaluate `predicates` against `left_expression` with evaluators already built.
///
/// Conversion failures and predicate mismatches are folded into the outcome;
/// only configuration inconsistencies come back as `Err`.
pub fn evaluate(
    left_expression: &str,
    predicates: &[Predicate],
    evaluators: &EvaluatorSet,
    bindings: &VariableBindings,
    options: &EngineOptions,
) -> Result<Verdict, EvaluationError> {
    let Some(left) = variables::resolve(left_expression, bindings, options)? else {
        return Ok(Verdict {
            outcome: Outcome::NullLeftValue,
            evaluated: 0,
            value: None,
        });
    };

    let context = Context {
        evaluators,
        bindings,
        options,
    };
    let mut state = State::new(left, context);
    let mut failed_at = None;

    for (index, predicate) in predicates.iter().enumerate() {
        state.evaluate(index, predicate)?;
        if !state.assertion_result() {
            failed_at = Some(index);
            break;
        }
    }

    let outcome = match failed_at {
        None => Outcome::Pass,
        Some(index) => Outcome::Fail {
            index,
            predicate: predicates[index].clone(),
        },
    };
    Ok(Verdict {
        outcome,
        evaluated: state.evaluated(),
        value: Some(state.into_value()),
    })
}

/// One-shot evaluation: build the evaluators, then evaluate.
pub fn check_policy(
    left_expression: &str,
    predicates: &[Predicate],
    bindings: &VariableBindings,
    options: &EngineOptions,
) -> Result<Verdict, CheckError> {
    let evaluators = EvaluatorSet::build(predicates)?;
    Ok(evaluate(
        left_expression,
        predicates,
        &evaluators,
        bindings,
        options,
    )?)
}

/// Either half of a one-shot check failing.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Server-side comparison assertion.
///
/// Immutable after construction; safe to share between threads.
#[derive(Debug, Clone)]
pub struct ComparisonAssertion {
    policy: ComparisonPolicy,
    options: EngineOptions,
    evaluators: EvaluatorSet,
}

impl ComparisonAssertion {
    pub fn new(policy: ComparisonPolicy, options: EngineOptions) -> Result<Self, ConfigError> {
        let evaluators = policy.compile()?;
        debug!(
            expression = %policy.expression,
            predicates = policy.predicates.len(),
            evaluators = evaluators.len(),
            "Comparison assertion compiled"
        );
        Ok(Self {
            policy,
            options,
            evaluators,
        })
    }

    pub fn policy(&self) -> &ComparisonPolicy {
        &self.policy
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate and return the raw verdict.
    pub fn check_policy(&self, bindings: &VariableBindings) -> Result<Verdict, EvaluationError> {
        evaluate(
            &self.policy.expression,
            &self.policy.predicates,
            &self.evaluators,
            bindings,
            &self.options,
        )
    }

    /// Evaluate and map the verdict to an assertion status, auditing the result.
    pub fn check_request(&self, bindings: &VariableBindings) -> AssertionStatus {
        match self.check_policy(bindings) {
            Ok(verdict) => match verdict.outcome {
                Outcome::Pass => {
                    debug!(expression = %self.policy.expression, "Comparison passed");
                    AssertionStatus::None
                }
                Outcome::Fail { index, predicate } => {
                    info!(
                        expression = %self.policy.expression,
                        index,
                        predicate = %predicate,
                        "Comparison failed"
                    );
                    AssertionStatus::Falsified
                }
                Outcome::NullLeftValue => {
                    info!(expression = %self.policy.expression, "Left value is null");
                    AssertionStatus::Failed
                }
            },
            Err(e) => {
                error!(
                    expression = %self.policy.expression,
                    error = %e,
                    "Assertion misconfigured"
                );
                AssertionStatus::ServerError
            }
        }
    }
}
