//! Multi-kind rule document container and accessors.

use super::{CommonMetadata, LocationConstraint, RuleDefinition, RuleKind};

/// A fully deserialized document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Standalone named rule.
    Rule(RuleDefinition),
    /// Location constraint -- resource selector, score and gating rules.
    Location(LocationConstraint),
}

impl RuleDocument {
    /// Get the document's metadata regardless of kind.
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::Rule(doc) => &doc.metadata,
            RuleDocument::Location(doc) => &doc.metadata,
        }
    }

    /// Get mutable reference to the document's metadata regardless of kind.
    pub fn metadata_mut(&mut self) -> &mut CommonMetadata {
        match self {
            RuleDocument::Rule(doc) => &mut doc.metadata,
            RuleDocument::Location(doc) => &mut doc.metadata,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDocument::Rule(_) => RuleKind::Rule,
            RuleDocument::Location(_) => RuleKind::LocationConstraint,
        }
    }

    /// Try to extract as a [`RuleDefinition`] reference.
    pub fn as_rule(&self) -> Option<&RuleDefinition> {
        match self {
            RuleDocument::Rule(doc) => Some(doc),
            _ => None,
        }
    }

    /// Try to extract as a [`LocationConstraint`] reference.
    pub fn as_location(&self) -> Option<&LocationConstraint> {
        match self {
            RuleDocument::Location(doc) => Some(doc),
            _ => None,
        }
    }

    /// Serialize this document to YAML, delegating to the inner type.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            RuleDocument::Rule(doc) => serde_yaml::to_string(doc),
            RuleDocument::Location(doc) => serde_yaml::to_string(doc),
        }
    }
}
