//! Evaluation context passed down a rule tree.

use std::collections::HashMap;
use std::ops::Range;

use chrono::{DateTime, Utc};

/// Everything a rule may be evaluated against.
///
/// Node attributes include the built-in `#uname`, `#kind` and `#id` entries
/// used by location checks. Resource and operation fields are only
/// consulted by `rsc_expression`, `op_expression` and `param`/`meta`
/// value sources.
#[derive(Debug, Clone, Default)]
pub struct RuleInput {
    pub now: DateTime<Utc>,
    pub node_attrs: HashMap<String, String>,

    pub rsc_standard: Option<String>,
    pub rsc_provider: Option<String>,
    pub rsc_agent: Option<String>,
    /// Resource instance parameters (`value_source: param`).
    pub rsc_params: HashMap<String, String>,
    /// Resource meta-attributes (`value_source: meta`).
    pub rsc_meta: HashMap<String, String>,

    pub op_name: Option<String>,
    pub op_interval_ms: Option<u64>,

    /// Resource id matched by a location constraint pattern.
    pub rsc_id: Option<String>,
    /// Capture group spans of that match, for `%N` expansion.
    pub rsc_id_submatches: Vec<Option<Range<usize>>>,
}

impl RuleInput {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    pub fn with_node_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_attrs.insert(name.into(), value.into());
        self
    }

    /// Set the resource agent's class, provider and type.
    pub fn with_resource(
        mut self,
        standard: impl Into<String>,
        provider: Option<&str>,
        agent: impl Into<String>,
    ) -> Self {
        self.rsc_standard = Some(standard.into());
        self.rsc_provider = provider.map(str::to_string);
        self.rsc_agent = Some(agent.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.rsc_params.insert(name.into(), value.into());
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.rsc_meta.insert(name.into(), value.into());
        self
    }

    pub fn with_operation(mut self, name: impl Into<String>, interval_ms: u64) -> Self {
        self.op_name = Some(name.into());
        self.op_interval_ms = Some(interval_ms);
        self
    }

    pub fn with_resource_id(
        mut self,
        rsc_id: impl Into<String>,
        submatches: Vec<Option<Range<usize>>>,
    ) -> Self {
        self.rsc_id = Some(rsc_id.into());
        self.rsc_id_submatches = submatches;
        self
    }
}
