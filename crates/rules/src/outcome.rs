//! Evaluation outcomes and the next-change watermark.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of evaluating a rule or one of its sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The expression passed.
    Ok,
    /// A date expression matched its range.
    WithinRange,
    /// The time is before the range; the result may change later.
    BeforeRange,
    /// The time is after the range.
    AfterRange,
    /// The expression could not be evaluated (treated as not passing).
    Undetermined,
    /// The expression was evaluated and did not pass.
    OpUnsatisfied,
}

impl RuleOutcome {
    /// Whether this outcome counts as the expression passing.
    pub fn passed(self) -> bool {
        matches!(self, RuleOutcome::Ok | RuleOutcome::WithinRange)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleOutcome::Ok => "ok",
            RuleOutcome::WithinRange => "within_range",
            RuleOutcome::BeforeRange => "before_range",
            RuleOutcome::AfterRange => "after_range",
            RuleOutcome::Undetermined => "undetermined",
            RuleOutcome::OpUnsatisfied => "op_unsatisfied",
        }
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Earliest known instant at which some evaluated expression could change.
///
/// Owned by the caller and threaded through evaluation as
/// `Option<&mut NextChange>`. Evaluators only ever move it earlier; an unset
/// watermark accepts the first candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NextChange(Option<DateTime<Utc>>);

impl NextChange {
    pub fn new() -> Self {
        Self(None)
    }

    /// A watermark that starts at `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self(Some(at))
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Move the watermark to `candidate` if that is earlier (or unset).
    pub fn set_if_earlier(&mut self, candidate: DateTime<Utc>) {
        match self.0 {
            Some(current) if current <= candidate => {}
            _ => self.0 = Some(candidate),
        }
    }
}

/// Apply `candidate` to an optional watermark.
pub(crate) fn set_if_earlier(next_change: Option<&mut NextChange>, candidate: DateTime<Utc>) {
    if let Some(next_change) = next_change {
        next_change.set_if_earlier(candidate);
    }
}
