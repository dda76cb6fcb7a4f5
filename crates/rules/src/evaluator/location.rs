//! Location constraint evaluation.

use std::ops::Range;

use crm_core::numeric::scan_ll;
use tracing::debug;

use super::{evaluate_rule, RuleInput};
use crate::error::{Result, RuleError};
use crate::outcome::{NextChange, RuleOutcome};
use crate::schema::LocationConstraint;
use crate::submatch::capture_spans;

/// Score meaning "must" (or, negated, "must not").
pub const INFINITY: i64 = 1_000_000;

/// Parse a constraint score: an integer or `[+-]INFINITY`, clamped to
/// `-INFINITY..=INFINITY`.
pub fn parse_score(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    match trimmed.to_ascii_uppercase().as_str() {
        "INFINITY" | "+INFINITY" => return Ok(INFINITY),
        "-INFINITY" => return Ok(-INFINITY),
        _ => {}
    }
    scan_ll(trimmed)
        .map(|score| score.clamp(-INFINITY, INFINITY))
        .map_err(|e| RuleError::Validation(format!("invalid score: {e}")))
}

impl LocationConstraint {
    /// Check that exactly one resource selector is set and that a pattern
    /// compiles. The compiled pattern is kept for later evaluations.
    pub fn validate(&self) -> Result<()> {
        match (&self.rsc, &self.rsc_pattern) {
            (Some(_), Some(_)) => {
                return Err(RuleError::Validation(format!(
                    "location constraint {} has both rsc and rsc_pattern",
                    self.metadata.id
                )));
            }
            (None, None) => {
                return Err(RuleError::Validation(format!(
                    "location constraint {} needs rsc or rsc_pattern",
                    self.metadata.id
                )));
            }
            (None, Some(pattern)) => {
                self.pattern_cache.compile(pattern)?;
            }
            (Some(_), None) => {}
        }
        self.score().map(|_| ())
    }

    /// The constraint's score; missing means 0.
    pub fn score(&self) -> Result<i64> {
        self.score.as_deref().map_or(Ok(0), parse_score)
    }

    /// If this constraint selects `rsc_id`, return the capture spans of the
    /// match (empty for a plain `rsc`).
    pub fn matches_resource(&self, rsc_id: &str) -> Result<Option<Vec<Option<Range<usize>>>>> {
        if let Some(rsc) = &self.rsc {
            return Ok((rsc == rsc_id).then(Vec::new));
        }
        let Some(pattern) = &self.rsc_pattern else {
            return Ok(None);
        };
        let re = self.pattern_cache.compile(pattern)?;
        Ok(re.captures(rsc_id).map(|caps| capture_spans(&caps)))
    }

    /// Evaluate the constraint for `rsc_id`.
    ///
    /// A resource the constraint does not select is
    /// [`RuleOutcome::OpUnsatisfied`]. Otherwise the constraint applies
    /// ([`RuleOutcome::Ok`]) when it has no rules or any rule passes. Every
    /// rule is evaluated so the watermark covers all of them.
    pub fn evaluate(
        &self,
        rsc_id: &str,
        input: &RuleInput,
        mut next_change: Option<&mut NextChange>,
    ) -> Result<RuleOutcome> {
        let Some(submatches) = self.matches_resource(rsc_id)? else {
            debug!(constraint = %self.metadata.id, rsc_id, "resource not selected by constraint");
            return Ok(RuleOutcome::OpUnsatisfied);
        };
        if self.rules.is_empty() {
            return Ok(RuleOutcome::Ok);
        }

        let input = input.clone().with_resource_id(rsc_id, submatches);
        let mut applies = false;
        for rule in &self.rules {
            if evaluate_rule(rule, &input, next_change.as_deref_mut())?.passed() {
                applies = true;
            }
        }

        Ok(if applies {
            RuleOutcome::Ok
        } else {
            RuleOutcome::OpUnsatisfied
        })
    }
}
