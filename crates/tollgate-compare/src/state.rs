//! Evaluation state machine for one run of a predicate chain.
//!
//! A state is created for exactly one evaluation and never shared. The
//! variant is fixed at construction:
//!
//! - `SingleValueState` - the left value is a scalar
//! - `MultiValueState` - the left value is a list; binary predicates and
//!   single-valued evaluators are broadcast over every element and must hold
//!   for all of them
//!
//! `dataType` predicates replace the working value(s) in place. A failed
//! coercion clears the running result without touching the working value.
//! Nothing is rolled back when a later predicate fails.

use crate::comparator;
use crate::config::EngineOptions;
use crate::error::EvaluationError;
use crate::evaluator::{Evaluator, EvaluatorSet};
use crate::predicate::{DataTypePredicate, Predicate};
use crate::value::{convert, Conversion, DataType, Value};
use crate::variables::VariableBindings;
use tracing::trace;

/// Read-only inputs shared by every predicate of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub evaluators: &'a EvaluatorSet,
    pub bindings: &'a VariableBindings,
    pub options: &'a EngineOptions,
}

/// Progress of one evaluation over a scalar or multi-valued left value.
#[derive(Debug)]
pub enum State<'a> {
    Single(SingleValueState<'a>),
    Multi(MultiValueState<'a>),
}

impl<'a> State<'a> {
    /// Pick the state variant for a resolved left value.
    ///
    /// A `Value::List` is flattened one level into a multi-value state.
    pub fn new(value: Value, context: Context<'a>) -> Self {
        match value {
            Value::List(values) => State::Multi(MultiValueState::new(values, context)),
            scalar => State::Single(SingleValueState::new(scalar, context)),
        }
    }

    /// Apply the predicate at `index` of the chain.
    pub fn evaluate(&mut self, index: usize, predicate: &Predicate) -> Result<(), EvaluationError> {
        match self {
            State::Single(state) => state.evaluate(index, predicate),
            State::Multi(state) => state.evaluate(index, predicate),
        }
    }

    /// Running AND of every predicate result so far.
    pub fn assertion_result(&self) -> bool {
        match self {
            State::Single(state) => state.assertion_result,
            State::Multi(state) => state.assertion_result,
        }
    }

    /// Number of predicates applied so far.
    pub fn evaluated(&self) -> usize {
        match self {
            State::Single(state) => state.evaluated,
            State::Multi(state) => state.evaluated,
        }
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, State::Multi(_))
    }

    /// The working value; a multi-value state yields a `Value::List`.
    pub fn into_value(self) -> Value {
        match self {
            State::Single(state) => state.value,
            State::Multi(state) => Value::List(state.values),
        }
    }
}

/// Fold one predicate result into the running result.
fn record(assertion_result: &mut bool, index: usize, predicate: &Predicate, result: bool) {
    let result = if predicate.is_negated() { !result } else { result };
    trace!(index, kind = predicate.kind(), result, "Predicate evaluated");
    *assertion_result &= result;
}

/// State over one scalar working value.
#[derive(Debug)]
pub struct SingleValueState<'a> {
    context: Context<'a>,
    value: Value,
    assertion_result: bool,
    evaluated: usize,
}

impl<'a> SingleValueState<'a> {
    pub fn new(value: Value, context: Context<'a>) -> Self {
        Self {
            context,
            value,
            assertion_result: true,
            evaluated: 0,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn assertion_result(&self) -> bool {
        self.assertion_result
    }

    pub fn evaluate(&mut self, index: usize, predicate: &Predicate) -> Result<(), EvaluationError> {
        self.evaluated += 1;
        let Context {
            evaluators,
            bindings,
            options,
        } = self.context;

        let result = match predicate {
            Predicate::DataType(DataTypePredicate { data_type }) => {
                match convert(&self.value, *data_type) {
                    Conversion::Converted(value) => self.value = value,
                    Conversion::Failed => self.assertion_result = false,
                }
                return Ok(());
            }
            Predicate::Binary(binary) => comparator::compare(&self.value, binary, bindings, options)?,
            _ => match evaluators.get(index) {
                Some(Evaluator::Single(evaluator)) => evaluator.evaluate(&self.value),
                Some(Evaluator::Multi(evaluator)) => {
                    evaluator.evaluate(std::slice::from_ref(&self.value))
                }
                None => return Err(EvaluationError::MissingEvaluator { index }),
            },
        };

        record(&mut self.assertion_result, index, predicate, result);
        Ok(())
    }
}

/// State over an ordered sequence of working values.
#[derive(Debug)]
pub struct MultiValueState<'a> {
    context: Context<'a>,
    values: Vec<Value>,
    /// Element type declared by the run's `dataType` predicate; set at most once
    declared_type: Option<DataType>,
    assertion_result: bool,
    evaluated: usize,
}

impl<'a> MultiValueState<'a> {
    pub fn new(values: Vec<Value>, context: Context<'a>) -> Self {
        Self {
            context,
            values,
            declared_type: None,
            assertion_result: true,
            evaluated: 0,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn declared_type(&self) -> Option<DataType> {
        self.declared_type
    }

    pub fn assertion_result(&self) -> bool {
        self.assertion_result
    }

    pub fn evaluate(&mut self, index: usize, predicate: &Predicate) -> Result<(), EvaluationError> {
        self.evaluated += 1;
        let Context {
            evaluators,
            bindings,
            options,
        } = self.context;

        let result = match predicate {
            Predicate::DataType(DataTypePredicate { data_type }) => {
                return self.coerce_all(*data_type);
            }
            Predicate::Binary(binary) => {
                let mut all = true;
                for value in &self.values {
                    if !comparator::compare(value, binary, bindings, options)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            _ => match evaluators.get(index) {
                Some(Evaluator::Multi(evaluator)) => evaluator.evaluate(&self.values),
                Some(Evaluator::Single(evaluator)) => {
                    self.values.iter().all(|value| evaluator.evaluate(value))
                }
                None => return Err(EvaluationError::MissingEvaluator { index }),
            },
        };

        record(&mut self.assertion_result, index, predicate, result);
        Ok(())
    }

    /// Convert every element or none of them.
    fn coerce_all(&mut self, data_type: DataType) -> Result<(), EvaluationError> {
        if let Some(declared) = self.declared_type {
            return Err(EvaluationError::DataTypeAlreadyDeclared {
                declared,
                requested: data_type,
            });
        }
        self.declared_type = Some(data_type);

        let staged: Option<Vec<Value>> = self
            .values
            .iter()
            .map(|value| convert(value, data_type).into_option())
            .collect();

        match staged {
            Some(converted) => self.values = converted,
            None => {
                trace!(%data_type, "Element failed to convert, values left unchanged");
                self.assertion_result = false;
            }
        }
        Ok(())
    }
}
