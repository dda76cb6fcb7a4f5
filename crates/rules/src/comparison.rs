//! Typed value comparison for attribute expressions.
//!
//! Values arrive as raw strings and are interpreted according to a
//! [`ValueType`], either declared on the expression or inferred from the
//! comparison operator and the operands themselves.

use std::cmp::Ordering;
use std::fmt;

use crm_core::numeric::{scan_double, scan_ll};
use crm_core::version::compare_version;
use tracing::debug;

// ── Comparison operators ────────────────────────────────────────────

/// Comparison operator of an attribute expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Defined,
    NotDefined,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Unknown,
}

impl Comparison {
    /// Parse an operator name (case-insensitive). Anything unrecognized,
    /// including a missing operator, is [`Comparison::Unknown`].
    pub fn parse(op: Option<&str>) -> Self {
        let Some(op) = op else {
            return Comparison::Unknown;
        };
        match op.to_ascii_lowercase().as_str() {
            "defined" => Comparison::Defined,
            "not_defined" => Comparison::NotDefined,
            "eq" => Comparison::Eq,
            "ne" => Comparison::Ne,
            "lt" => Comparison::Lt,
            "lte" => Comparison::Lte,
            "gt" => Comparison::Gt,
            "gte" => Comparison::Gte,
            _ => Comparison::Unknown,
        }
    }

    /// Whether this is one of the ordering operators (`lt`, `lte`, `gt`, `gte`).
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Comparison::Lt | Comparison::Lte | Comparison::Gt | Comparison::Gte
        )
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Defined => "defined",
            Comparison::NotDefined => "not_defined",
            Comparison::Eq => "eq",
            Comparison::Ne => "ne",
            Comparison::Lt => "lt",
            Comparison::Lte => "lte",
            Comparison::Gt => "gt",
            Comparison::Gte => "gte",
            Comparison::Unknown => "unknown",
        })
    }
}

// ── Value types ─────────────────────────────────────────────────────

/// How the two sides of a comparison are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Number,
    Version,
    Unknown,
}

impl ValueType {
    /// Resolve the type for a comparison.
    ///
    /// A declared type is honoured (case-insensitive; unrecognized names
    /// give [`ValueType::Unknown`]). Without one, ordering operators use
    /// `Number` when either operand contains a decimal point and `Integer`
    /// otherwise; every other operator uses `String`.
    pub fn resolve(
        declared: Option<&str>,
        comparison: Comparison,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Self {
        let Some(declared) = declared else {
            if !comparison.is_ordering() {
                return ValueType::String;
            }
            let has_point = |v: Option<&str>| v.is_some_and(|v| v.contains('.'));
            return if has_point(left) || has_point(right) {
                ValueType::Number
            } else {
                ValueType::Integer
            };
        };

        match declared.to_ascii_lowercase().as_str() {
            "string" => ValueType::String,
            "integer" => ValueType::Integer,
            "number" => ValueType::Number,
            "version" => ValueType::Version,
            _ => ValueType::Unknown,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Version => "version",
            ValueType::Unknown => "unknown",
        })
    }
}

// ── Comparison ──────────────────────────────────────────────────────

/// Compare two raw values as the given type.
///
/// Missing values order before present ones and two missing values are
/// equal, whatever the type. Integer and number comparisons fall back to a
/// string comparison when either side fails to parse. An unknown type
/// compares everything as equal.
pub fn compare_by_type(left: Option<&str>, right: Option<&str>, value_type: ValueType) -> Ordering {
    let (l, r) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        (None, None) => return Ordering::Equal,
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
    };

    match value_type {
        ValueType::String => compare_ignore_ascii_case(l, r),
        ValueType::Integer => match (scan_ll(l), scan_ll(r)) {
            (Ok(l_num), Ok(r_num)) => l_num.cmp(&r_num),
            _ => {
                debug!(left = l, right = r, "integer parse error, comparing as strings");
                compare_ignore_ascii_case(l, r)
            }
        },
        ValueType::Number => match (scan_double(l), scan_double(r)) {
            (Ok(l_num), Ok(r_num)) => l_num.partial_cmp(&r_num).unwrap_or(Ordering::Equal),
            _ => {
                debug!(left = l, right = r, "floating-point parse error, comparing as strings");
                compare_ignore_ascii_case(l, r)
            }
        },
        ValueType::Version => compare_version(l, r),
        ValueType::Unknown => Ordering::Equal,
    }
}

/// Byte-wise comparison after ASCII lowercasing (`strcasecmp` semantics).
fn compare_ignore_ascii_case(l: &str, r: &str) -> Ordering {
    l.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(r.bytes().map(|b| b.to_ascii_lowercase()))
}

// ── Tests ───────────────────────────────────────────────────────────
