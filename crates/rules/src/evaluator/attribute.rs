//! Node attribute and location expressions.

use std::cmp::Ordering;

use tracing::warn;

use super::RuleInput;
use crate::comparison::{compare_by_type, Comparison, ValueType};
use crate::outcome::RuleOutcome;
use crate::schema::AttributeExpression;
use crate::submatch::expand_submatches;

/// Where an attribute expression's comparison value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The `value` text itself.
    Literal,
    /// The resource parameter named by `value`.
    InstanceAttr,
    /// The resource meta-attribute named by `value`.
    MetaAttr,
}

impl ValueSource {
    /// Parse a source name (case-insensitive); missing means literal.
    pub fn parse(source: Option<&str>) -> Option<Self> {
        match source.map(str::to_ascii_lowercase).as_deref() {
            None | Some("literal") => Some(ValueSource::Literal),
            Some("param") => Some(ValueSource::InstanceAttr),
            Some("meta") => Some(ValueSource::MetaAttr),
            Some(_) => None,
        }
    }
}

pub(super) fn evaluate_attr_expression(expr: &AttributeExpression, input: &RuleInput) -> RuleOutcome {
    let id = expr.id.as_deref().unwrap_or("without ID");

    let Some(attribute) = expr.attribute.as_deref() else {
        warn!(id, "treating expression as not passing because it has no attribute");
        return RuleOutcome::OpUnsatisfied;
    };
    let attribute = match &input.rsc_id {
        Some(rsc_id) => expand_submatches(attribute, rsc_id, &input.rsc_id_submatches),
        None => attribute.into(),
    };

    let comparison = Comparison::parse(expr.operation.as_deref());
    if comparison == Comparison::Unknown {
        warn!(id, operation = expr.operation.as_deref(), "treating expression as not passing because operation is invalid");
        return RuleOutcome::OpUnsatisfied;
    }
    if matches!(comparison, Comparison::Defined | Comparison::NotDefined) && expr.value.is_some() {
        warn!(id, %comparison, "ignoring value in expression because it is not used");
    }

    let source = ValueSource::parse(expr.value_source.as_deref()).unwrap_or_else(|| {
        warn!(id, value_source = expr.value_source.as_deref(), "using literal value_source because the given one is invalid");
        ValueSource::Literal
    });
    let reference = match (source, expr.value.as_deref()) {
        (_, None) => None,
        (ValueSource::Literal, Some(value)) => Some(value),
        (ValueSource::InstanceAttr, Some(name)) => input.rsc_params.get(name).map(String::as_str),
        (ValueSource::MetaAttr, Some(name)) => input.rsc_meta.get(name).map(String::as_str),
    };

    let actual = input.node_attrs.get(attribute.as_ref()).map(String::as_str);
    let value_type = ValueType::resolve(expr.value_type.as_deref(), comparison, actual, reference);
    if value_type == ValueType::Unknown {
        warn!(id, value_type = expr.value_type.as_deref(), "comparing values as equal because type is not recognized");
    }

    if compare_attr(comparison, actual, reference, value_type) {
        RuleOutcome::Ok
    } else {
        RuleOutcome::OpUnsatisfied
    }
}

fn compare_attr(
    comparison: Comparison,
    actual: Option<&str>,
    reference: Option<&str>,
    value_type: ValueType,
) -> bool {
    match comparison {
        Comparison::Defined => actual.is_some(),
        Comparison::NotDefined => actual.is_none(),
        Comparison::Eq => compare_by_type(actual, reference, value_type) == Ordering::Equal,
        Comparison::Ne => compare_by_type(actual, reference, value_type) != Ordering::Equal,
        Comparison::Lt | Comparison::Lte | Comparison::Gt | Comparison::Gte => {
            if actual.is_none() || reference.is_none() {
                return false;
            }
            let order = compare_by_type(actual, reference, value_type);
            match comparison {
                Comparison::Lt => order == Ordering::Less,
                Comparison::Lte => order != Ordering::Greater,
                Comparison::Gt => order == Ordering::Greater,
                _ => order != Ordering::Less,
            }
        }
        Comparison::Unknown => false,
    }
}
