//! Resource agent and operation expressions.

use crm_core::interval::parse_interval_ms;
use tracing::warn;

use super::RuleInput;
use crate::outcome::RuleOutcome;
use crate::schema::{OperationExpression, ResourceExpression};

pub(super) fn evaluate_rsc_expression(expr: &ResourceExpression, input: &RuleInput) -> RuleOutcome {
    let checks = [
        (expr.standard.as_deref(), input.rsc_standard.as_deref()),
        (expr.provider.as_deref(), input.rsc_provider.as_deref()),
        (expr.agent.as_deref(), input.rsc_agent.as_deref()),
    ];
    let matched = checks
        .iter()
        .all(|(wanted, actual)| wanted.is_none() || wanted == actual);

    if matched {
        RuleOutcome::Ok
    } else {
        RuleOutcome::OpUnsatisfied
    }
}

pub(super) fn evaluate_op_expression(expr: &OperationExpression, input: &RuleInput) -> RuleOutcome {
    let id = expr.id.as_deref().unwrap_or("without ID");

    let Some(name) = expr.name.as_deref() else {
        warn!(id, "treating op_expression as not passing because it has no name");
        return RuleOutcome::Undetermined;
    };

    let interval_ms = match expr.interval.as_deref().map(parse_interval_ms) {
        None => None,
        Some(Ok(ms)) => Some(ms),
        Some(Err(e)) => {
            warn!(id, error = %e, "treating op_expression as not passing because interval is invalid");
            return RuleOutcome::Undetermined;
        }
    };

    if input.op_name.as_deref() != Some(name) {
        return RuleOutcome::OpUnsatisfied;
    }
    if interval_ms.is_some() && interval_ms != input.op_interval_ms {
        return RuleOutcome::OpUnsatisfied;
    }
    RuleOutcome::Ok
}
