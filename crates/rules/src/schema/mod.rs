//! YAML DSL schema types with serde deserialization.
//!
//! Defines the type hierarchy for rule documents:
//! - `RuleEnvelope`: lightweight first-pass header (apiVersion, kind, metadata)
//! - `RuleDocument`: enum dispatching to kind-specific types
//! - `Rule` / `RuleExpression`: the recursive rule tree shared by all kinds

mod date;
mod document;
mod envelope;
mod expression;
mod kind;
mod location;
mod metadata;
mod rule;
mod scalar;

pub use date::*;
pub use document::*;
pub use envelope::*;
pub use expression::*;
pub use kind::*;
pub use location::*;
pub use metadata::*;
pub use rule::*;

#[cfg(test)]
mod tests;
