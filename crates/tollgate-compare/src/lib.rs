//! Typed predicate comparison engine for gateway policy assertions.
//!
//! A comparison assertion resolves one left-hand expression against the
//! request's context variables and applies an ordered chain of predicates to
//! it. Predicates may coerce the working value to a declared type, compare it
//! against a right-hand expression, or run a kind-specific check (regex,
//! length, numeric range, cardinality, emptiness). Multi-valued variables are
//! evaluated element-wise with "all must hold" semantics.
//!
//! # Example
//!
//! ```
//! use tollgate_compare::assertion::{ComparisonAssertion, Outcome};
//! use tollgate_compare::config::{ComparisonPolicy, EngineOptions};
//! use tollgate_compare::predicate::{Operator, Predicate};
//! use tollgate_compare::variables::VariableBindings;
//!
//! let policy = ComparisonPolicy::new(
//!     "${request.size}",
//!     vec![Predicate::binary(Operator::GreaterThan, "3")],
//! );
//! let assertion = ComparisonAssertion::new(policy, EngineOptions::default()).unwrap();
//!
//! let vars = VariableBindings::new().with("request.size", 5i64);
//! assert_eq!(assertion.check_policy(&vars).unwrap().outcome, Outcome::Pass);
//! ```

pub mod assertion;
pub mod comparator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod predicate;
pub mod state;
pub mod value;
pub mod variables;

pub use assertion::{AssertionStatus, ComparisonAssertion, Outcome, Verdict};
pub use error::{ConfigError, ConversionError, EvaluationError, VariableError};
