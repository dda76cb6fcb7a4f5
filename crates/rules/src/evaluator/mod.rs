//! Rule tree evaluation.
//!
//! A rule combines sub-expressions with `and` or `or`. Each sub-expression
//! is classified by [`ExpressionType`] and dispatched to the matching
//! evaluator:
//! - **date** expressions check the evaluation time (and may report when
//!   the result next changes)
//! - **attribute** and **location** expressions compare node attributes
//! - **resource** and **operation** expressions match the resource agent
//!   and the operation being configured
//! - nested **rules** recurse

mod attribute;
mod input;
mod location;
mod resource;

pub use attribute::ValueSource;
pub use input::RuleInput;
pub use location::{parse_score, INFINITY};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::date::evaluate_date_expression;
use crate::error::Result;
use crate::outcome::{NextChange, RuleOutcome};
use crate::schema::{BooleanOp, Rule, RuleDocument, RuleExpression, RuleKind};

use attribute::evaluate_attr_expression;
use resource::{evaluate_op_expression, evaluate_rsc_expression};

// ── Rule trees ──────────────────────────────────────────────────────

/// Evaluate a rule: [`RuleOutcome::Ok`] when it passes, otherwise
/// [`RuleOutcome::OpUnsatisfied`].
///
/// `and` stops at the first sub-expression that does not pass and `or` at
/// the first that does. A rule without sub-expressions passes.
pub fn evaluate_rule(
    rule: &Rule,
    input: &RuleInput,
    mut next_change: Option<&mut NextChange>,
) -> Result<RuleOutcome> {
    let id = rule.id.as_deref().unwrap_or("without ID");

    let op = BooleanOp::parse(rule.boolean_op.as_deref());
    if op == BooleanOp::Unknown {
        warn!(id, boolean_op = rule.boolean_op.as_deref(), "treating rule as not passing because boolean_op is invalid");
        return Ok(RuleOutcome::OpUnsatisfied);
    }

    if rule.expressions.is_empty() {
        warn!(id, "rule contains no conditions, treating it as passing");
        return Ok(RuleOutcome::Ok);
    }

    let mut passed = op == BooleanOp::And;
    for expr in &rule.expressions {
        let sub_passed = evaluate_expression(expr, input, next_change.as_deref_mut())?.passed();
        match op {
            BooleanOp::And if !sub_passed => {
                passed = false;
                break;
            }
            BooleanOp::Or if sub_passed => {
                passed = true;
                break;
            }
            _ => {}
        }
    }

    let outcome = if passed {
        RuleOutcome::Ok
    } else {
        RuleOutcome::OpUnsatisfied
    };
    trace!(id, %outcome, "evaluated rule");
    Ok(outcome)
}

/// Evaluate one sub-expression of a rule.
pub fn evaluate_expression(
    expr: &RuleExpression,
    input: &RuleInput,
    next_change: Option<&mut NextChange>,
) -> Result<RuleOutcome> {
    let expression_type = expr.expression_type();
    let outcome = match expr {
        RuleExpression::Rule(rule) => evaluate_rule(rule, input, next_change)?,
        RuleExpression::DateExpression(date) => {
            evaluate_date_expression(date, &input.now, next_change)?
        }
        RuleExpression::Expression(attr) => evaluate_attr_expression(attr, input),
        RuleExpression::RscExpression(rsc) => evaluate_rsc_expression(rsc, input),
        RuleExpression::OpExpression(op) => evaluate_op_expression(op, input),
    };
    trace!(
        id = expr.id().unwrap_or("without ID"),
        %expression_type,
        %outcome,
        "evaluated expression"
    );
    Ok(outcome)
}

// ── Documents ───────────────────────────────────────────────────────

/// Result of evaluating one loaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub id: String,
    pub kind: RuleKind,
    pub outcome: RuleOutcome,
    /// Resource the constraint was evaluated for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsc_id: Option<String>,
    /// Constraint score, for location constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// Evaluates loaded rule documents.
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Evaluate a document against `input`.
    ///
    /// Returns `None` for disabled documents and for pattern constraints
    /// when `input` names no resource to match against.
    pub fn evaluate(
        doc: &RuleDocument,
        input: &RuleInput,
        next_change: Option<&mut NextChange>,
    ) -> Result<Option<Evaluation>> {
        let metadata = doc.metadata();
        if !metadata.enabled {
            debug!(id = %metadata.id, "skipping disabled document");
            return Ok(None);
        }

        let evaluation = match doc {
            RuleDocument::Rule(def) => Evaluation {
                id: metadata.id.clone(),
                kind: RuleKind::Rule,
                outcome: evaluate_rule(&def.rule, input, next_change)?,
                rsc_id: None,
                score: None,
            },
            RuleDocument::Location(constraint) => {
                let Some(rsc_id) = input.rsc_id.as_ref().or(constraint.rsc.as_ref()) else {
                    debug!(id = %metadata.id, "no resource to match location constraint against");
                    return Ok(None);
                };
                Evaluation {
                    id: metadata.id.clone(),
                    kind: RuleKind::LocationConstraint,
                    outcome: constraint.evaluate(rsc_id, input, next_change)?,
                    rsc_id: Some(rsc_id.clone()),
                    score: Some(constraint.score()?),
                }
            }
        };
        Ok(Some(evaluation))
    }
}
