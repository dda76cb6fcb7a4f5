//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// A standalone named rule.
    Rule,
    /// Rules gating where a resource (or resources matching a pattern) may run.
    LocationConstraint,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Rule => write!(f, "Rule"),
            RuleKind::LocationConstraint => write!(f, "LocationConstraint"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Rule" => Ok(RuleKind::Rule),
            "LocationConstraint" => Ok(RuleKind::LocationConstraint),
            other => Err(format!("unknown rule kind: '{}'", other)),
        }
    }
}
