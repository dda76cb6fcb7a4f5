//! Filesystem rule loader with hot-reload via `notify` watcher.
//!
//! Watches the rules directory for YAML file changes (create, modify, delete)
//! and reloads affected documents into the in-memory set.
//! Supports all document kinds via two-pass deserialization (RuleEnvelope -> RuleDocument).

mod core;
mod error;
mod watcher;


pub use self::core::{parse_document, RuleLoader};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
