//! Cluster rule expression engine.
//!
//! This crate provides:
//! - YAML rule and location-constraint documents with serde deserialization
//! - Attribute, date/time, resource and operation expression evaluation
//! - Boolean rule composition with nested rules and next-change tracking
//! - Regex-selected location constraints with `%N` submatch expansion
//! - Filesystem loader with hot-reload via `notify` watcher

pub mod comparison;
pub mod date;
pub mod error;
pub mod evaluator;
pub mod expression_type;
pub mod loader;
pub mod outcome;
pub mod schema;
pub mod submatch;

pub use error::{Result, RuleError};
pub use evaluator::{evaluate_expression, evaluate_rule, Evaluation, RuleEvaluator, RuleInput};
pub use outcome::{NextChange, RuleOutcome};
