//! Location constraint and standalone rule documents.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::scalar::opt_text;
use super::{CommonMetadata, Rule};

/// A standalone named rule (`kind: Rule`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub rule: Rule,
}

/// Rules deciding whether a resource may run on the evaluated node
/// (`kind: LocationConstraint`).
///
/// Exactly one of `rsc` (a resource id) or `rsc_pattern` (a regular
/// expression over resource ids) selects the resources it applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LocationConstraint {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsc_pattern: Option<String>,
    /// Integer score, `INFINITY` or `-INFINITY`.
    #[serde(default, deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    /// The constraint applies when any rule passes (or when there are none).
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(skip)]
    pub(crate) pattern_cache: PatternCache,
}

/// `rsc_pattern` compiled on first use (normally at load time).
///
/// Compares equal to any other cache: it is derived from `rsc_pattern`.
#[derive(Debug, Clone, Default)]
pub(crate) struct PatternCache(OnceLock<Regex>);

impl PatternCache {
    /// The compiled form of `pattern`. A pattern that differs from the cached
    /// one is compiled afresh and not cached.
    pub(crate) fn compile(&self, pattern: &str) -> Result<Cow<'_, Regex>, regex::Error> {
        if let Some(re) = self.0.get() {
            if re.as_str() == pattern {
                return Ok(Cow::Borrowed(re));
            }
            return Regex::new(pattern).map(Cow::Owned);
        }
        let re = Regex::new(pattern)?;
        Ok(Cow::Borrowed(self.0.get_or_init(|| re)))
    }

    pub(crate) fn is_compiled(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for PatternCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
