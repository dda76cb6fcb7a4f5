//! Rule trees: a boolean combination of sub-expressions.

use serde::{Deserialize, Serialize};

use super::{AttributeExpression, DateExpression, OperationExpression, ResourceExpression};
use crate::expression_type::{self, ExpressionType};

/// A rule: sub-expressions combined with `and` (default) or `or`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_op: Option<String>,
    /// Each node is a single-key map (`- expression: {...}`), nested rules
    /// included.
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub expressions: Vec<RuleExpression>,
}

/// One node of a rule tree, tagged by element name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuleExpression {
    DateExpression(DateExpression),
    /// Node attribute comparison (or location check for `#uname`, `#kind`, `#id`).
    Expression(AttributeExpression),
    RscExpression(ResourceExpression),
    OpExpression(OperationExpression),
    /// Nested rule.
    Rule(Rule),
}

impl RuleExpression {
    /// The element name this node was tagged with.
    pub fn element_name(&self) -> &'static str {
        match self {
            RuleExpression::DateExpression(_) => expression_type::DATE_EXPRESSION,
            RuleExpression::Expression(_) => expression_type::EXPRESSION,
            RuleExpression::RscExpression(_) => expression_type::RSC_EXPRESSION,
            RuleExpression::OpExpression(_) => expression_type::OP_EXPRESSION,
            RuleExpression::Rule(_) => expression_type::RULE,
        }
    }

    /// The node's `id`, if it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            RuleExpression::DateExpression(e) => e.id.as_deref(),
            RuleExpression::Expression(e) => e.id.as_deref(),
            RuleExpression::RscExpression(e) => e.id.as_deref(),
            RuleExpression::OpExpression(e) => e.id.as_deref(),
            RuleExpression::Rule(r) => r.id.as_deref(),
        }
    }

    /// Classify this node for evaluation dispatch.
    pub fn expression_type(&self) -> ExpressionType {
        let attribute = match self {
            RuleExpression::Expression(e) => e.attribute.as_deref(),
            _ => None,
        };
        ExpressionType::for_element(self.element_name(), attribute)
    }
}

/// How a rule combines its sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
    Unknown,
}

impl BooleanOp {
    /// Parse `and`/`or` case-insensitively; a missing value means `and`.
    pub fn parse(op: Option<&str>) -> Self {
        match op.map(str::to_ascii_lowercase).as_deref() {
            None | Some("and") => BooleanOp::And,
            Some("or") => BooleanOp::Or,
            Some(_) => BooleanOp::Unknown,
        }
    }
}
