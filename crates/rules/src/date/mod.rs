//! Date expression evaluation.
//!
//! A date expression checks the evaluation time against an absolute range
//! (`in_range`), a single bound (`gt`, `lt`) or a recurring calendar pattern
//! (`date_spec`). Range checks also report when their result will next
//! change, so callers can sleep until then instead of polling.

mod date_spec;
mod duration;

pub use date_spec::{evaluate_date_spec, phase_of_the_moon};
pub use duration::unpack_duration;

use chrono::{DateTime, Utc};
use crm_core::iso8601::{add_seconds, parse_datetime};
use tracing::{trace, warn};

use crate::error::Result;
use crate::outcome::{set_if_earlier, NextChange, RuleOutcome};
use crate::schema::DateExpression;

/// Date expression operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOperation {
    InRange,
    DateSpec,
    Gt,
    Lt,
}

impl DateOperation {
    /// Parse an operation name (case-insensitive). A missing operation is
    /// `in_range`; an unrecognized one is `None`.
    pub fn parse(op: Option<&str>) -> Option<Self> {
        let Some(op) = op else {
            return Some(DateOperation::InRange);
        };
        match op.to_ascii_lowercase().as_str() {
            "in_range" => Some(DateOperation::InRange),
            "date_spec" => Some(DateOperation::DateSpec),
            "gt" => Some(DateOperation::Gt),
            "lt" => Some(DateOperation::Lt),
            _ => None,
        }
    }
}

/// Evaluate a date expression at `now`.
///
/// Returns [`RuleOutcome::WithinRange`] or [`RuleOutcome::Ok`] when the
/// expression passes. When `next_change` is given, it is moved earlier to
/// the instant the result will next change, if that is known.
///
/// Configuration problems (missing or unparsable bounds, an unknown
/// operation, a missing date spec) are logged and evaluate to
/// [`RuleOutcome::Undetermined`].
pub fn evaluate_date_expression(
    expr: &DateExpression,
    now: &DateTime<Utc>,
    next_change: Option<&mut NextChange>,
) -> Result<RuleOutcome> {
    let id = expr.id.as_deref().unwrap_or_else(|| {
        warn!("date_expression has no id");
        "without ID"
    });
    let op = expr.operation.as_deref();

    let outcome = match DateOperation::parse(op) {
        Some(DateOperation::InRange) => evaluate_in_range(expr, id, now, next_change),
        Some(DateOperation::DateSpec) => match &expr.date_spec {
            // TODO: compute when the date spec will next change
            Some(spec) => evaluate_date_spec(spec, now),
            None => {
                warn!(id, "treating date_expression as not passing because date_spec operations require a date_spec");
                RuleOutcome::Undetermined
            }
        },
        Some(DateOperation::Gt) => evaluate_gt(expr, id, now, next_change),
        Some(DateOperation::Lt) => evaluate_lt(expr, id, now, next_change),
        None => {
            warn!(id, operation = op.unwrap_or(""), "treating date_expression as not passing because operation is invalid");
            RuleOutcome::Undetermined
        }
    };

    trace!(id, operation = op.unwrap_or("in_range"), %outcome, "evaluated date_expression");
    Ok(outcome)
}

/// Parse an optional timestamp attribute. `Err(())` means it was present
/// but unparsable.
fn parse_bound(value: Option<&str>) -> std::result::Result<Option<DateTime<Utc>>, ()> {
    match value {
        None => Ok(None),
        Some(text) => parse_datetime(text).map(Some).map_err(|_| ()),
    }
}

fn evaluate_in_range(
    expr: &DateExpression,
    id: &str,
    now: &DateTime<Utc>,
    next_change: Option<&mut NextChange>,
) -> RuleOutcome {
    let start = parse_bound(expr.start.as_deref()).unwrap_or_else(|()| {
        warn!(id, value = expr.start.as_deref(), "ignoring start in date_expression because it is invalid");
        None
    });
    let mut end = parse_bound(expr.end.as_deref()).unwrap_or_else(|()| {
        warn!(id, value = expr.end.as_deref(), "ignoring end in date_expression because it is invalid");
        None
    });

    if start.is_none() && end.is_none() {
        warn!(id, "treating date_expression as not passing because in_range requires at least one of start or end");
        return RuleOutcome::Undetermined;
    }

    if end.is_none() && expr.duration.is_some() {
        // Component errors are already logged; the best-effort end is used
        let _ = unpack_duration(expr.duration.as_ref(), start.as_ref(), &mut end);
    }

    if let Some(start) = start {
        if *now < start {
            set_if_earlier(next_change, start);
            return RuleOutcome::BeforeRange;
        }
    }

    if let Some(end) = end {
        if *now > end {
            return RuleOutcome::AfterRange;
        }
        // The result holds until the second after the end
        if let Some(after_end) = add_seconds(&end, 1) {
            set_if_earlier(next_change, after_end);
        }
    }

    RuleOutcome::WithinRange
}

fn evaluate_gt(
    expr: &DateExpression,
    id: &str,
    now: &DateTime<Utc>,
    next_change: Option<&mut NextChange>,
) -> RuleOutcome {
    let start = match parse_bound(expr.start.as_deref()) {
        Ok(Some(start)) => start,
        Ok(None) => {
            warn!(id, "treating date_expression as not passing because gt requires start");
            return RuleOutcome::Undetermined;
        }
        Err(()) => {
            warn!(id, value = expr.start.as_deref(), "treating date_expression as not passing because start is invalid");
            return RuleOutcome::Undetermined;
        }
    };

    if *now > start {
        return RuleOutcome::WithinRange;
    }

    if let Some(after_start) = add_seconds(&start, 1) {
        set_if_earlier(next_change, after_start);
    }
    RuleOutcome::BeforeRange
}

fn evaluate_lt(
    expr: &DateExpression,
    id: &str,
    now: &DateTime<Utc>,
    next_change: Option<&mut NextChange>,
) -> RuleOutcome {
    let end = match parse_bound(expr.end.as_deref()) {
        Ok(Some(end)) => end,
        Ok(None) => {
            warn!(id, "treating date_expression as not passing because lt requires end");
            return RuleOutcome::Undetermined;
        }
        Err(()) => {
            warn!(id, value = expr.end.as_deref(), "treating date_expression as not passing because end is invalid");
            return RuleOutcome::Undetermined;
        }
    };

    if *now < end {
        set_if_earlier(next_change, end);
        return RuleOutcome::WithinRange;
    }
    RuleOutcome::AfterRange
}
