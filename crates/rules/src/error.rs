//! Error types shared by the evaluator and the rule loader.

use crm_core::iso8601::TimeComponent;

/// Errors that can occur during rule evaluation, loading and management.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A required input was missing or a precondition was violated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A duration component could not be applied.
    #[error("Invalid {component} '{value}' in duration {id}: {reason}")]
    InvalidDuration {
        id: String,
        component: TimeComponent,
        value: String,
        reason: String,
    },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Invalid resource pattern in a location constraint.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Rule validation error (e.g. missing required fields, unknown kind).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
