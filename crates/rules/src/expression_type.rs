//! Classification of rule sub-expressions by element name.

use std::fmt;

pub const DATE_EXPRESSION: &str = "date_expression";
pub const EXPRESSION: &str = "expression";
pub const RSC_EXPRESSION: &str = "rsc_expression";
pub const OP_EXPRESSION: &str = "op_expression";
pub const RULE: &str = "rule";

/// Node attributes that turn a plain expression into a location check.
const LOCATION_ATTRIBUTES: &[&str] = &["#uname", "#kind", "#id"];

/// What kind of sub-expression a rule node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// Compares a node attribute against a value.
    Attribute,
    /// Compares one of the node's built-in identity attributes.
    Location,
    DateTime,
    Resource,
    Operation,
    /// A nested rule.
    Rule,
    Unknown,
}

impl ExpressionType {
    /// Classify a node from its element name and, for plain expressions,
    /// the attribute it tests.
    pub fn for_element(tag: &str, attribute: Option<&str>) -> Self {
        match tag {
            DATE_EXPRESSION => ExpressionType::DateTime,
            RSC_EXPRESSION => ExpressionType::Resource,
            OP_EXPRESSION => ExpressionType::Operation,
            RULE => ExpressionType::Rule,
            EXPRESSION => match attribute {
                Some(attr) if LOCATION_ATTRIBUTES.contains(&attr) => ExpressionType::Location,
                _ => ExpressionType::Attribute,
            },
            _ => ExpressionType::Unknown,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpressionType::Attribute => "attribute",
            ExpressionType::Location => "location",
            ExpressionType::DateTime => "datetime",
            ExpressionType::Resource => "resource",
            ExpressionType::Operation => "operation",
            ExpressionType::Rule => "rule",
            ExpressionType::Unknown => "unknown",
        })
    }
}
